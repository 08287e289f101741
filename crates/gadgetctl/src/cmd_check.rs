use anyhow::{bail, Context, Result};
use gadgets::core::Specification;
use gadgets::Gadgets;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::common;

#[derive(Serialize)]
struct CheckReport<'a> {
    url: &'a str,
    checksum: &'a str,
    views: usize,
    round_trip: bool,
}

/// Serialize `spec` and parse it again, reporting whether nothing was lost.
pub fn round_trips(spec: &Specification) -> Result<bool> {
    let xml = spec.to_xml();
    let again = Specification::parse(spec.url().clone(), &xml)
        .context("re-parse serialized gadget")?;
    Ok(again.root() == spec.root() && again.views() == spec.views())
}

pub async fn run(gadgets: &Gadgets, url: &Url, print_xml: bool, json: bool) -> Result<()> {
    let spec = gadgets
        .resolve(url, true)
        .await
        .with_context(|| format!("validate gadget {url}"))?;
    let round_trip = round_trips(&spec)?;
    if !round_trip {
        warn!(url = %url, "serialized gadget differs from the source");
    }

    if json {
        let report = CheckReport {
            url: url.as_str(),
            checksum: spec.checksum(),
            views: spec.views().len(),
            round_trip,
        };
        common::print_json(&report)?;
    } else if print_xml {
        println!("{}", spec.to_xml());
    } else {
        info!(url = %url, views = spec.views().len(), "gadget is valid");
        println!("OK {url} ({} views, sha256 {})", spec.views().len(), spec.checksum());
    }

    if !round_trip {
        bail!("gadget {url} does not survive a serialize/parse round trip");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_round_trip() {
        let url = Url::parse("file:///g.xml").expect("url");
        let spec = Specification::parse(
            url,
            r#"<Module xmlns:x="urn:x"><ModulePrefs title="t" x:a="1"><x:ext>v</x:ext></ModulePrefs><Content><![CDATA[<b>]]></Content></Module>"#,
        )
        .expect("spec");
        assert!(round_trips(&spec).expect("round trip"));
    }
}
