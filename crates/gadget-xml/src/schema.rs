//! Per-element schemas driving the parser, the writer and substitution.
//!
//! A schema is plain static data: the element's local name, the attributes it
//! recognizes (and how each one is substituted), the child elements it knows
//! by name, how it treats character data, and a validator that runs once when
//! the element closes. Vocabularies are declared as `static` items that refer
//! to each other, so looking up a child builder is a slice scan with no
//! allocation.

use std::fmt;

use crate::element::Element;
use crate::ParseError;

/// How a recognized attribute value takes part in substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Copied verbatim.
    Plain,
    /// Placeholder tokens are replaced.
    Text,
    /// Placeholder tokens are replaced, then the result is resolved against
    /// the document base URI.
    Uri,
    /// Comma separated list; every item is substituted on its own.
    List,
}

/// A recognized attribute of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Canonical (lowercase) attribute name. Matching is case-insensitive.
    pub name: &'static str,
    pub kind: ValueKind,
}

impl AttributeSpec {
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: ValueKind::Plain,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ValueKind::Text,
        }
    }

    pub const fn uri(name: &'static str) -> Self {
        Self {
            name,
            kind: ValueKind::Uri,
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: ValueKind::List,
        }
    }
}

/// Treatment of non-whitespace character data inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPolicy {
    /// Any non-whitespace text is a parse error.
    Forbidden,
    /// Text is appended as read. `substitute` marks it as a substitutable field.
    Accumulate { substitute: bool },
    /// Text is appended with surrounding whitespace removed.
    Trimmed,
}

/// Validation hook executed at the closing tag.
pub type Validator = fn(&Element) -> Result<(), ParseError>;

/// Builder description for one element type.
pub struct ElementSchema {
    pub local_name: &'static str,
    pub attributes: &'static [AttributeSpec],
    pub children: &'static [&'static ElementSchema],
    pub text: TextPolicy,
    pub validate: Validator,
}

impl ElementSchema {
    /// Find the recognized attribute matching `name`, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// Find the builder registered for a child element by local name.
    pub fn child(&self, local_name: &str) -> Option<&'static ElementSchema> {
        self.children
            .iter()
            .copied()
            .find(|schema| schema.local_name == local_name)
    }

    /// Whether this schema accepts a document rooted at `local_name`.
    pub fn accepts_root(&self, local_name: &str) -> bool {
        self.local_name.eq_ignore_ascii_case(local_name)
    }
}

impl fmt::Debug for ElementSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSchema")
            .field("local_name", &self.local_name)
            .field("attributes", &self.attributes.len())
            .field("children", &self.children.len())
            .field("text", &self.text)
            .finish()
    }
}

/// Validator for element types without constraints.
pub fn accept_any(_: &Element) -> Result<(), ParseError> {
    Ok(())
}
