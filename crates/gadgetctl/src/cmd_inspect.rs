use anyhow::{Context, Result};
use gadgets::core::Specification;
use gadgets::Gadgets;
use serde::Serialize;
use tracing::info;
use url::Url;

#[derive(Debug, Serialize)]
pub struct Summary {
    url: String,
    checksum: String,
    title: String,
    description: Option<String>,
    author: Option<String>,
    features: Vec<FeatureEntry>,
    locales: Vec<LocaleEntry>,
    user_prefs: Vec<UserPrefEntry>,
    views: Vec<ViewEntry>,
}

#[derive(Debug, Serialize)]
struct FeatureEntry {
    name: String,
    required: bool,
}

#[derive(Debug, Serialize)]
struct LocaleEntry {
    locale: String,
    messages: Option<String>,
    inline: usize,
}

#[derive(Debug, Serialize)]
struct UserPrefEntry {
    name: String,
    datatype: String,
    default_value: String,
}

#[derive(Debug, Serialize)]
struct ViewEntry {
    name: String,
    #[serde(rename = "type")]
    content_type: String,
    href: Option<String>,
    length: usize,
}

impl Summary {
    pub fn of(spec: &Specification) -> Self {
        let prefs = spec.module_prefs();
        Summary {
            url: spec.url().to_string(),
            checksum: spec.checksum().to_string(),
            title: prefs.title().to_string(),
            description: prefs.description().map(str::to_string),
            author: prefs.author().map(str::to_string),
            features: prefs
                .features()
                .map(|feature| FeatureEntry {
                    name: feature.name().to_string(),
                    required: feature.is_required(),
                })
                .collect(),
            locales: prefs
                .locales()
                .map(|locale| LocaleEntry {
                    locale: locale.locale().to_string(),
                    messages: locale.messages().map(str::to_string),
                    inline: locale.msgs().count(),
                })
                .collect(),
            user_prefs: spec
                .user_prefs()
                .map(|pref| UserPrefEntry {
                    name: pref.name().to_string(),
                    datatype: pref.data_type().to_string(),
                    default_value: pref.default_value().to_string(),
                })
                .collect(),
            views: spec
                .views()
                .iter()
                .map(|(name, view)| ViewEntry {
                    name: name.clone(),
                    content_type: view.content_type().to_string(),
                    href: view.href().map(str::to_string),
                    length: view.content().len(),
                })
                .collect(),
        }
    }
}

pub async fn run(gadgets: &Gadgets, url: &Url, json: bool) -> Result<()> {
    let spec = gadgets
        .resolve(url, true)
        .await
        .with_context(|| format!("load gadget {url}"))?;
    info!(url = %url, "loaded gadget");
    let summary = Summary::of(&spec);

    if json {
        return crate::common::print_json(&summary);
    }

    println!("{} ({})", summary.title, summary.url);
    if let Some(description) = &summary.description {
        println!("  {description}");
    }
    if let Some(author) = &summary.author {
        println!("  author: {author}");
    }
    println!("  checksum: {}", summary.checksum);

    if !summary.features.is_empty() {
        println!("\n{:<32} {}", "FEATURE", "REQUIRED");
        for feature in &summary.features {
            println!("{:<32} {}", feature.name, feature.required);
        }
    }
    if !summary.locales.is_empty() {
        println!("\n{:<10} {:<8} {}", "LOCALE", "INLINE", "MESSAGES");
        for locale in &summary.locales {
            println!(
                "{:<10} {:<8} {}",
                locale.locale,
                locale.inline,
                locale.messages.as_deref().unwrap_or("-")
            );
        }
    }
    if !summary.user_prefs.is_empty() {
        println!("\n{:<20} {:<8} {}", "USERPREF", "TYPE", "DEFAULT");
        for pref in &summary.user_prefs {
            println!("{:<20} {:<8} {}", pref.name, pref.datatype, pref.default_value);
        }
    }
    println!("\n{:<16} {:<6} {}", "VIEW", "TYPE", "CONTENT");
    for view in &summary.views {
        let detail = match view.href.as_deref() {
            Some(href) => href.to_string(),
            None => format!("{} bytes", view.length),
        };
        println!("{:<16} {:<6} {}", view.name, view.content_type, detail);
    }
    Ok(())
}
