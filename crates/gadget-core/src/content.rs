use std::fmt;

use gadget_xml::{Element, ParseError};

use crate::values::{flag, list, number};

/// How a view delivers its markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Inline HTML carried in the element body.
    #[default]
    Html,
    /// The container redirects to `href`.
    Url,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("html") || value.eq_ignore_ascii_case("html-inline") {
            Some(ContentType::Html)
        } else if value.eq_ignore_ascii_case("url") {
            Some(ContentType::Url)
        } else {
            None
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("type") {
            None => Ok(ContentType::Html),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!(
                    "{}@type value '{raw}' is unknown",
                    element.local_name()
                ))
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentType::Html => "html",
            ContentType::Url => "url",
        })
    }
}

/// Authentication applied to proxied requests (`authz`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    #[default]
    None,
    Signed,
    OAuth,
}

impl AuthType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(AuthType::None),
            "signed" => Some(AuthType::Signed),
            "oauth" => Some(AuthType::OAuth),
            _ => None,
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("authz") {
            None => Ok(AuthType::None),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!(
                    "{}@authz value '{raw}' is unknown",
                    element.local_name()
                ))
            }),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthType::None => "none",
            AuthType::Signed => "signed",
            AuthType::OAuth => "oauth",
        })
    }
}

/// Name of the view used when a `Content` element does not declare one.
pub const DEFAULT_VIEW: &str = "default";

/// A `Content` element.
#[derive(Debug, Clone, Copy)]
pub struct Content<'a> {
    element: &'a Element,
}

impl<'a> Content<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Declared type; validated documents never carry unknown values.
    pub fn content_type(&self) -> ContentType {
        ContentType::from_attr(self.element).unwrap_or_default()
    }

    /// `type` exactly as written.
    pub fn raw_type(&self) -> Option<&'a str> {
        self.element.attr("type")
    }

    pub fn href(&self) -> Option<&'a str> {
        self.element.attr("href")
    }

    /// View names this section contributes to.
    pub fn views(&self) -> Vec<&'a str> {
        let views = list(self.element, "view");
        if views.is_empty() {
            vec![DEFAULT_VIEW]
        } else {
            views
        }
    }

    pub fn preferred_height(&self) -> Option<u32> {
        number(self.element, "preferred_height")
    }

    pub fn preferred_width(&self) -> Option<u32> {
        number(self.element, "preferred_width")
    }

    /// Explicit `authz`, if any.
    pub fn auth_type(&self) -> Option<AuthType> {
        self.element.attr("authz").and_then(AuthType::parse)
    }

    pub fn quirks(&self) -> bool {
        flag(self.element, "quirks", false)
    }

    /// Explicit `sign_owner`, if any.
    pub fn sign_owner(&self) -> Option<bool> {
        self.element
            .attr("sign_owner")
            .map(|_| flag(self.element, "sign_owner", true))
    }

    /// Explicit `sign_viewer`, if any.
    pub fn sign_viewer(&self) -> Option<bool> {
        self.element
            .attr("sign_viewer")
            .map(|_| flag(self.element, "sign_viewer", true))
    }

    /// Inline HTML body.
    pub fn body(&self) -> &'a str {
        self.element.text()
    }
}
