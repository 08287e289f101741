//! Recursive-descent engine that turns a [`TokenStream`] into an [`Element`]
//! tree under the direction of an [`ElementSchema`].

use tracing::debug;

use crate::element::Element;
use crate::schema::{ElementSchema, TextPolicy};
use crate::tokens::{StartTag, Token, TokenStream};
use crate::ParseError;

/// Deepest element nesting accepted in a document.
pub const MAX_DEPTH: usize = 256;

/// Parse a complete document whose root must match `root`.
///
/// Leading whitespace, comments and declarations are skipped; anything other
/// than whitespace after the root element is rejected.
pub fn parse_document(xml: &str, root: &'static ElementSchema) -> Result<Element, ParseError> {
    let mut stream = TokenStream::from_str(xml);
    let start = loop {
        match stream.next_token()? {
            Token::Start(tag) => break tag,
            Token::Text(text) if text.trim().is_empty() => continue,
            Token::Eof => return Err(ParseError::Xml("document has no root element".into())),
            other => {
                return Err(ParseError::Xml(format!(
                    "unexpected content before root element: {other:?}"
                )))
            }
        }
    };
    if !root.accepts_root(start.name.local_name()) {
        return Err(ParseError::UnexpectedRoot {
            expected: root.local_name.to_string(),
            found: start.name.to_string(),
        });
    }
    let element = parse(&mut stream, start, Some(root))?;
    loop {
        match stream.next_token()? {
            Token::Eof => return Ok(element),
            Token::Text(text) if text.trim().is_empty() => {}
            _ => {
                return Err(ParseError::Xml(
                    "unexpected content after root element".into(),
                ))
            }
        }
    }
}

/// Build the element opened by `start`, consuming tokens up to and including
/// its end tag.
///
/// `schema` is `None` for extension elements, which are walked and preserved
/// without validation.
pub fn parse(
    stream: &mut TokenStream<'_>,
    start: StartTag,
    schema: Option<&'static ElementSchema>,
) -> Result<Element, ParseError> {
    let mut element = Element::new(start.name, schema);
    element.namespaces = start.namespaces;
    for attr in start.attributes {
        element.insert_attribute(attr.name, attr.value);
    }

    loop {
        match stream.next_token()? {
            Token::Start(mut tag) => {
                if stream.depth() > MAX_DEPTH {
                    return Err(ParseError::Invalid("document nested too deeply".into()));
                }
                tag.name = tag.name.inherit_namespace(element.name.namespace());
                let child_schema = child_schema(&element, &tag);
                if child_schema.is_none() {
                    debug!(
                        parent = %element.name,
                        element = %tag.name,
                        "preserving unrecognized element"
                    );
                }
                let child = parse(stream, tag, child_schema)?;
                element.push_child(child);
            }
            Token::Text(text) => append_text(&mut element, &text, false)?,
            Token::CData(text) => append_text(&mut element, &text, true)?,
            Token::End(_) => {
                if let Some(schema) = element.schema {
                    (schema.validate)(&element)?;
                }
                return Ok(element);
            }
            Token::Eof => {
                return Err(ParseError::UnexpectedEof {
                    element: element.name.to_string(),
                })
            }
        }
    }
}

fn child_schema(parent: &Element, tag: &StartTag) -> Option<&'static ElementSchema> {
    // A prefix that was never declared cannot name a vocabulary element.
    if tag.name.prefix().is_some() && tag.name.namespace().is_none() {
        return None;
    }
    if !parent.name.same_namespace(tag.name.namespace()) {
        return None;
    }
    parent.schema?.child(tag.name.local_name())
}

fn append_text(element: &mut Element, text: &str, cdata: bool) -> Result<(), ParseError> {
    let policy = element
        .schema
        .map_or(TextPolicy::Accumulate { substitute: false }, |s| s.text);
    match policy {
        // Whitespace between tags is layout here.
        TextPolicy::Forbidden => {
            if !text.trim().is_empty() {
                return Err(ParseError::UnexpectedText {
                    element: element.name.to_string(),
                });
            }
        }
        TextPolicy::Accumulate { .. } => {
            element.text.push_str(text);
            element.cdata |= cdata;
        }
        TextPolicy::Trimmed => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                element.text.push_str(trimmed);
                element.cdata |= cdata;
            }
        }
    }
    Ok(())
}
