//! Streaming, schema-driven XML parsing into extensible element trees.
//!
//! Vocabularies describe their element types as static [`ElementSchema`]
//! items. [`parse_str`] walks a document with a namespace-aware
//! [`TokenStream`], builds one [`Element`] per start tag (falling back to a
//! pass-through node for names no schema registers) and runs each schema's
//! validator when the element closes. Trees serialize back with
//! [`Element::to_xml`] and are rewritten with [`Element::substitute`].

use thiserror::Error;

pub mod element;
pub mod name;
pub mod parser;
pub mod schema;
pub mod substitute;
pub mod tokens;
mod writer;

pub use element::{Attribute, Element};
pub use name::{NamespaceDecl, QualifiedName, XML_NAMESPACE};
pub use parser::{parse, parse_document, MAX_DEPTH};
pub use schema::{accept_any, AttributeSpec, ElementSchema, TextPolicy, ValueKind};
pub use substitute::Substituter;
pub use tokens::{Token, TokenStream};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("unexpected end of document inside <{element}>")]
    UnexpectedEof { element: String },
    #[error("text is not allowed inside <{element}>")]
    UnexpectedText { element: String },
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Parse `xml` as a document rooted at `root`.
pub fn parse_str(xml: &str, root: &'static ElementSchema) -> Result<Element, ParseError> {
    parse_document(xml, root)
}
