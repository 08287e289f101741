//! Attribute value conversions shared by the typed views and validators.

use std::str::FromStr;

use gadget_xml::{Element, ParseError};
use url::Url;

/// Boolean attribute; anything other than `true`/`false` yields `default`.
pub(crate) fn flag(element: &Element, name: &str, default: bool) -> bool {
    match element.attr(name).map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("true") => true,
        Some(value) if value.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

/// Numeric attribute; missing or unparsable values yield `None`.
pub(crate) fn number<T: FromStr>(element: &Element, name: &str) -> Option<T> {
    element.attr(name)?.trim().parse().ok()
}

/// Comma separated attribute split into trimmed, non-empty items.
pub(crate) fn list<'a>(element: &'a Element, name: &str) -> Vec<&'a str> {
    element
        .attr(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn required<'a>(element: &'a Element, name: &str) -> Result<&'a str, ParseError> {
    element.attr(name).ok_or_else(|| {
        ParseError::Invalid(format!("{}@{name} is required", element.local_name()))
    })
}

/// Check that an attribute, when present, is a valid URI reference.
pub(crate) fn check_uri(element: &Element, name: &str) -> Result<(), ParseError> {
    if let Some(value) = element.attr(name) {
        let base = Url::parse("http://localhost/")
            .map_err(|err| ParseError::Invalid(err.to_string()))?;
        base.join(value.trim()).map_err(|err| {
            ParseError::Invalid(format!(
                "{}@{name} is not a valid URI '{value}': {err}",
                element.local_name()
            ))
        })?;
    }
    Ok(())
}

/// Resolve `value` against `base`, falling back to the value itself.
pub fn resolve(base: &Url, value: &str) -> String {
    base.join(value.trim())
        .map(String::from)
        .unwrap_or_else(|_| value.to_string())
}
