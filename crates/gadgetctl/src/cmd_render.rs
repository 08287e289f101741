use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use gadgets::core::{ContentType, Locale};
use gadgets::{Gadgets, RenderRequest};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::common;

#[derive(Debug)]
pub struct RenderArgs {
    pub url: Url,
    pub locale: Locale,
    pub view: String,
    pub prefs: BTreeMap<String, String>,
    pub module_id: u64,
}

#[derive(Serialize)]
struct Rendered<'a> {
    title: &'a str,
    view: &'a str,
    #[serde(rename = "type")]
    content_type: String,
    href: Option<&'a str>,
    content: &'a str,
}

pub async fn run(gadgets: &Gadgets, args: RenderArgs, json: bool) -> Result<()> {
    let mut request = RenderRequest::new(args.url.clone())
        .locale(args.locale.clone())
        .module_id(args.module_id)
        .ignore_cache(true);
    request.user_prefs = args.prefs;

    let spec = gadgets
        .render(&request)
        .await
        .with_context(|| format!("render gadget {}", args.url))?;
    let view = spec.view(&args.view).ok_or_else(|| {
        let known: Vec<&str> = spec.views().keys().map(String::as_str).collect();
        anyhow!("gadget has no view '{}' (available: {})", args.view, known.join(", "))
    })?;
    info!(view = %args.view, locale = %args.locale, "rendered gadget");

    if json {
        let rendered = Rendered {
            title: spec.module_prefs().title(),
            view: &args.view,
            content_type: view.content_type().to_string(),
            href: view.href(),
            content: view.content(),
        };
        return common::print_json(&rendered);
    }

    match view.content_type() {
        ContentType::Url => println!("{}", view.href().unwrap_or_default()),
        ContentType::Html => println!("{}", view.content()),
    }
    Ok(())
}
