//! Namespace-aware token stream on top of quick-xml.
//!
//! The parser engine only ever sees [`Token`]s: empty elements are expanded
//! into a start/end pair, namespace declarations are split off the attribute
//! list and every prefix is resolved against the declarations in scope.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::name::{NamespaceDecl, QualifiedName, XML_NAMESPACE};
use crate::ParseError;

/// Raw attribute as it appeared on a start tag, after prefix resolution.
///
/// Unprefixed attributes carry no namespace; whether they belong to the
/// element's own vocabulary is decided by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: QualifiedName,
    pub value: String,
}

/// Opening tag with its attributes and namespace declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: QualifiedName,
    pub attributes: Vec<RawAttribute>,
    pub namespaces: Vec<NamespaceDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(StartTag),
    End(QualifiedName),
    /// Character data with entities already expanded.
    Text(String),
    /// Contents of a `<![CDATA[ ... ]]>` section, verbatim.
    CData(String),
    Eof,
}

/// Pull-style token source over an in-memory document.
pub struct TokenStream<'a> {
    reader: Reader<&'a [u8]>,
    scopes: Vec<Vec<NamespaceDecl>>,
    pending_end: Option<QualifiedName>,
}

impl<'a> TokenStream<'a> {
    pub fn from_str(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);
        Self {
            reader,
            scopes: Vec::new(),
            pending_end: None,
        }
    }

    /// Current element nesting depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Read the next token, skipping comments, processing instructions and
    /// declarations.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if let Some(name) = self.pending_end.take() {
            self.scopes.pop();
            return Ok(Token::End(name));
        }
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|err| ParseError::Xml(err.to_string()))?;
            match event {
                Event::Start(start) => return self.open(&start).map(Token::Start),
                Event::Empty(start) => {
                    let tag = self.open(&start)?;
                    self.pending_end = Some(tag.name.clone());
                    return Ok(Token::Start(tag));
                }
                Event::End(end) => {
                    let qname = end.name();
                    let raw = utf8(qname.as_ref())?;
                    let name = self.resolve_element(raw);
                    self.scopes.pop();
                    return Ok(Token::End(name));
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|err| ParseError::Xml(err.to_string()))?;
                    return Ok(Token::Text(value.into_owned()));
                }
                Event::CData(cdata) => {
                    let raw = cdata.into_inner();
                    return Ok(Token::CData(utf8(&raw)?.to_string()));
                }
                Event::Eof => return Ok(Token::Eof),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<StartTag, ParseError> {
        let mut namespaces = Vec::new();
        let mut pending = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| ParseError::Xml(err.to_string()))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::Xml(err.to_string()))?
                .into_owned();
            if key == "xmlns" {
                namespaces.push(NamespaceDecl {
                    prefix: None,
                    uri: value,
                });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.push(NamespaceDecl {
                    prefix: Some(prefix.to_string()),
                    uri: value,
                });
            } else {
                pending.push((key, value));
            }
        }
        self.scopes.push(namespaces.clone());

        let name = self.resolve_element(utf8(start.name().as_ref())?);
        let attributes = pending
            .into_iter()
            .map(|(key, value)| RawAttribute {
                name: self.resolve_attribute(&key),
                value,
            })
            .collect();
        Ok(StartTag {
            name,
            attributes,
            namespaces,
        })
    }

    fn resolve_element(&self, raw: &str) -> QualifiedName {
        let (prefix, local) = QualifiedName::split_lexical(raw);
        let namespace = self.lookup(prefix);
        QualifiedName::prefixed(namespace, prefix, local)
    }

    fn resolve_attribute(&self, raw: &str) -> QualifiedName {
        match QualifiedName::split_lexical(raw) {
            (Some(prefix), local) => {
                QualifiedName::prefixed(self.lookup(Some(prefix)), Some(prefix), local)
            }
            // Unprefixed attributes never pick up the default namespace.
            (None, local) => QualifiedName::new(None, local),
        }
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|decl| decl.prefix.as_deref() == prefix)
            .map(|decl| decl.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|err| ParseError::Xml(format!("invalid UTF-8: {err}")))
}
