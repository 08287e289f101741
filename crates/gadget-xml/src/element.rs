//! Generic element node produced by the parser.

use std::collections::BTreeMap;

use crate::name::{NamespaceDecl, QualifiedName};
use crate::schema::ElementSchema;

/// An attribute preserved outside of the element's recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

/// One node of a parsed document.
///
/// Every element type shares this representation; what differs is the
/// [`ElementSchema`] it was built with. Elements without a schema are
/// extension elements the vocabulary does not know about: they are walked
/// and kept like any other node so they survive a parse/serialize cycle.
///
/// Elements are only assembled by the parser and by [`Element::substitute`]
/// and expose no mutating API once built.
///
/// [`Element::substitute`]: crate::substitute
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) name: QualifiedName,
    pub(crate) schema: Option<&'static ElementSchema>,
    pub(crate) attributes: BTreeMap<&'static str, String>,
    pub(crate) other_attributes: Vec<Attribute>,
    pub(crate) foreign_attributes: Vec<Attribute>,
    pub(crate) namespaces: Vec<NamespaceDecl>,
    pub(crate) children: Vec<Element>,
    /// Byte offset into `text` at which each child was read.
    pub(crate) child_offsets: Vec<usize>,
    pub(crate) text: String,
    pub(crate) cdata: bool,
}

impl Element {
    pub(crate) fn new(name: QualifiedName, schema: Option<&'static ElementSchema>) -> Self {
        Self {
            name,
            schema,
            attributes: BTreeMap::new(),
            other_attributes: Vec::new(),
            foreign_attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
            child_offsets: Vec::new(),
            text: String::new(),
            cdata: false,
        }
    }

    /// Store an attribute in the bucket matching its namespace and the schema.
    pub(crate) fn insert_attribute(&mut self, name: QualifiedName, value: String) {
        let own_namespace = match name.namespace() {
            None => name.prefix().is_none(),
            Some(namespace) => self.name.same_namespace(Some(namespace)),
        };
        if !own_namespace {
            self.foreign_attributes.push(Attribute { name, value });
            return;
        }
        match self.schema.and_then(|schema| schema.attribute(name.local_name())) {
            Some(spec) => {
                self.attributes.insert(spec.name, value);
            }
            None => self.other_attributes.push(Attribute { name, value }),
        }
    }

    /// Append a child after the text read so far.
    pub(crate) fn push_child(&mut self, child: Element) {
        self.child_offsets.push(self.text.len());
        self.children.push(child);
    }

    /// Text runs split at child positions: one more run than there are
    /// children, with run `i` preceding child `i`.
    pub(crate) fn text_runs(&self) -> impl Iterator<Item = &str> + '_ {
        let mut start = 0;
        self.child_offsets
            .iter()
            .copied()
            .chain(std::iter::once(self.text.len()))
            .map(move |end| {
                let run = &self.text[start..end];
                start = end;
                run
            })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }

    /// Schema the element was built with; `None` for extension elements.
    pub fn schema(&self) -> Option<&'static ElementSchema> {
        self.schema
    }

    /// Whether the element was built by `schema`.
    pub fn is(&self, schema: &'static ElementSchema) -> bool {
        self.schema
            .is_some_and(|own| std::ptr::eq(own, schema))
    }

    /// Value of a recognized attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        let spec = self.schema?.attribute(name)?;
        self.attributes.get(spec.name).map(String::as_str)
    }

    /// Recognized attributes keyed by their canonical name.
    pub fn attributes(&self) -> &BTreeMap<&'static str, String> {
        &self.attributes
    }

    /// Unrecognized attribute in the element's own namespace, ignoring case.
    pub fn other_attr(&self, name: &str) -> Option<&str> {
        self.other_attributes
            .iter()
            .find(|attr| attr.name.local_name().eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn other_attributes(&self) -> &[Attribute] {
        &self.other_attributes
    }

    /// Attributes from other namespaces, preserved opaquely.
    pub fn foreign_attributes(&self) -> &[Attribute] {
        &self.foreign_attributes
    }

    /// Namespace declarations made on this element.
    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Children built by `schema`, in document order.
    pub fn children_of(
        &self,
        schema: &'static ElementSchema,
    ) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter(move |child| child.is(schema))
    }

    pub fn first_child(&self, schema: &'static ElementSchema) -> Option<&Element> {
        self.children_of(schema).next()
    }

    /// Children that no registered builder recognized.
    pub fn unrecognized_children(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter(|child| child.schema.is_none())
    }

    /// All character data of the element, concatenated in document order.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text was read from a CDATA section.
    pub fn is_cdata(&self) -> bool {
        self.cdata
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        let same_schema = match (self.schema, other.schema) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_schema
            && self.name == other.name
            && self.name.prefix() == other.name.prefix()
            && self.attributes == other.attributes
            && self.other_attributes == other.other_attributes
            && self.foreign_attributes == other.foreign_attributes
            && self.namespaces == other.namespaces
            && self.children == other.children
            && self.child_offsets == other.child_offsets
            && self.text == other.text
            && self.cdata == other.cdata
    }
}

impl Eq for Element {}
