use std::collections::BTreeMap;

use anyhow::{Context, Result};
use gadgets::core::{Locale, MessageBundle};
use gadgets::Gadgets;
use serde::Serialize;
use url::Url;

use crate::common;

#[derive(Debug, Serialize)]
pub struct BundleReport<'a> {
    locale: String,
    direction: String,
    messages: &'a BTreeMap<String, String>,
}

impl<'a> BundleReport<'a> {
    pub fn new(locale: &Locale, bundle: &'a MessageBundle) -> Self {
        Self {
            locale: locale.to_string(),
            direction: bundle.direction().to_string(),
            messages: bundle.messages(),
        }
    }
}

/// Print the merged messages for `locale` as JSON.
pub async fn run(gadgets: &Gadgets, url: &Url, locale: &Locale) -> Result<()> {
    let spec = gadgets
        .resolve(url, true)
        .await
        .with_context(|| format!("load gadget {url}"))?;
    let bundle = gadgets.get_bundle(&spec, locale, true).await;
    common::print_json(&BundleReport::new(locale, &bundle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gadgets::core::Direction;

    #[test]
    fn report_serializes_direction_and_messages() {
        let messages = BTreeMap::from([("hello".to_string(), "hi".to_string())]);
        let bundle = MessageBundle::new(messages, Some(Direction::Rtl));
        let locale = Locale::new("he", "IL");
        let json = serde_json::to_value(BundleReport::new(&locale, &bundle)).expect("json");
        assert_eq!(json["locale"], "he_IL");
        assert_eq!(json["direction"], "rtl");
        assert_eq!(json["messages"]["hello"], "hi");
    }
}
