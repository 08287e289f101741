//! Namespace-qualified names.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An element or attribute name resolved against the namespaces in scope.
///
/// Equality and hashing only look at the namespace URI and the local part.
/// The lexical prefix is carried along so a tree can be written back out the
/// way it was read, including prefixes that were never declared.
#[derive(Debug, Clone, Eq)]
pub struct QualifiedName {
    namespace: Option<String>,
    local: String,
    prefix: Option<String>,
}

impl QualifiedName {
    /// Create an unprefixed name.
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.to_string(),
            prefix: None,
        }
    }

    /// Create a name that keeps its lexical prefix.
    pub fn prefixed(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.to_string(),
            prefix: prefix.map(str::to_string),
        }
    }

    /// Split a lexical `prefix:local` name without resolving the prefix.
    pub fn split_lexical(raw: &str) -> (Option<&str>, &str) {
        match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                (Some(prefix), local)
            }
            _ => (None, raw),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Whether `other` lives in the same namespace, ignoring ASCII case.
    pub fn same_namespace(&self, other: Option<&str>) -> bool {
        match (self.namespace(), other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    /// Return a copy placed in `namespace` when this name has none of its own.
    pub(crate) fn inherit_namespace(mut self, namespace: Option<&str>) -> Self {
        if self.namespace.is_none() && self.prefix.is_none() {
            self.namespace = namespace.map(str::to_string);
        }
        self
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) found on an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceDecl {
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    pub uri: String,
}

impl NamespaceDecl {
    /// Attribute name used to write this declaration back out.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_does_not_affect_equality() {
        let a = QualifiedName::prefixed(Some("urn:x"), Some("a"), "foo");
        let b = QualifiedName::prefixed(Some("urn:x"), Some("b"), "foo");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "a:foo");
        assert_ne!(a, QualifiedName::new(None, "foo"));
    }

    #[test]
    fn split_lexical_names() {
        assert_eq!(QualifiedName::split_lexical("conf:foo"), (Some("conf"), "foo"));
        assert_eq!(QualifiedName::split_lexical("foo"), (None, "foo"));
        assert_eq!(QualifiedName::split_lexical(":foo"), (None, ":foo"));
    }

    #[test]
    fn inherit_only_applies_to_plain_names() {
        let plain = QualifiedName::new(None, "Content").inherit_namespace(Some("urn:g"));
        assert_eq!(plain.namespace(), Some("urn:g"));
        let foreign =
            QualifiedName::prefixed(None, Some("conf"), "foo").inherit_namespace(Some("urn:g"));
        assert_eq!(foreign.namespace(), None);
    }
}
