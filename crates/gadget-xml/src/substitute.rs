//! Schema-driven substitution over element trees.

use crate::element::Element;
use crate::schema::{TextPolicy, ValueKind};

/// Source of replacement values for placeholder tokens.
///
/// Implementations must be total: tokens they do not know are left in place.
pub trait Substituter {
    /// Replace placeholder tokens in free text.
    fn substitute_text(&self, value: &str) -> String;

    /// Replace placeholder tokens and resolve the result as a URI reference.
    fn substitute_uri(&self, value: &str) -> String {
        self.substitute_text(value)
    }
}

impl Element {
    /// Build an independent copy with every substitutable field rewritten.
    ///
    /// Which fields take part is decided by each element's schema: recognized
    /// attributes by their [`ValueKind`], text by [`TextPolicy::Accumulate`]
    /// with `substitute` set. Extension elements, unrecognized and foreign
    /// attributes are copied verbatim. `self` is never modified.
    pub fn substitute(&self, substituter: &dyn Substituter) -> Element {
        let Some(schema) = self.schema else {
            return self.clone();
        };
        let mut copy = Element::new(self.name.clone(), Some(schema));
        copy.namespaces = self.namespaces.clone();
        copy.other_attributes = self.other_attributes.clone();
        copy.foreign_attributes = self.foreign_attributes.clone();
        copy.cdata = self.cdata;

        for spec in schema.attributes {
            let Some(value) = self.attributes.get(spec.name) else {
                continue;
            };
            let value = match spec.kind {
                ValueKind::Plain => value.clone(),
                ValueKind::Text => substituter.substitute_text(value),
                ValueKind::Uri => substituter.substitute_uri(value),
                ValueKind::List => value
                    .split(',')
                    .map(|item| substituter.substitute_text(item.trim()))
                    .collect::<Vec<_>>()
                    .join(","),
            };
            copy.attributes.insert(spec.name, value);
        }

        let rewrite = matches!(schema.text, TextPolicy::Accumulate { substitute: true });
        let mut runs = self.text_runs();
        for child in &self.children {
            copy.push_text(runs.next().unwrap_or_default(), rewrite, substituter);
            copy.push_child(child.substitute(substituter));
        }
        copy.push_text(runs.next().unwrap_or_default(), rewrite, substituter);
        copy
    }

    fn push_text(&mut self, run: &str, rewrite: bool, substituter: &dyn Substituter) {
        if rewrite {
            self.text.push_str(&substituter.substitute_text(run));
        } else {
            self.text.push_str(run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use crate::schema::{accept_any, AttributeSpec, ElementSchema};

    struct Upper;

    impl Substituter for Upper {
        fn substitute_text(&self, value: &str) -> String {
            value.replace("__X__", "done")
        }

        fn substitute_uri(&self, value: &str) -> String {
            format!("http://base/{}", self.substitute_text(value))
        }
    }

    static PART: ElementSchema = ElementSchema {
        local_name: "part",
        attributes: &[
            AttributeSpec::plain("id"),
            AttributeSpec::text("label"),
            AttributeSpec::uri("href"),
            AttributeSpec::list("tags"),
        ],
        children: &[],
        text: TextPolicy::Accumulate { substitute: true },
        validate: accept_any,
    };

    static WHOLE: ElementSchema = ElementSchema {
        local_name: "whole",
        attributes: &[],
        children: &[&PART],
        text: TextPolicy::Forbidden,
        validate: accept_any,
    };

    #[test]
    fn rewrites_only_substitutable_fields() {
        let doc = parse_document(
            r#"<whole><part id="__X__" label="__X__!" href="__X__.xml" tags="a, __X__" odd="__X__">t __X__</part><ext>__X__</ext></whole>"#,
            &WHOLE,
        )
        .expect("parse");
        let before = doc.clone();
        let out = doc.substitute(&Upper);
        assert_eq!(doc, before);

        let part = out.first_child(&PART).expect("part");
        assert_eq!(part.attr("id"), Some("__X__"));
        assert_eq!(part.attr("label"), Some("done!"));
        assert_eq!(part.attr("href"), Some("http://base/done.xml"));
        assert_eq!(part.attr("tags"), Some("a,done"));
        assert_eq!(part.other_attr("odd"), Some("__X__"));
        assert_eq!(part.text(), "t done");
        assert_eq!(out.unrecognized_children().next().map(|e| e.text()), Some("__X__"));
        assert_eq!(out, doc.substitute(&Upper));
    }

    #[test]
    fn text_around_extension_children_stays_in_place() {
        let doc = parse_document(
            "<whole><part>__X__<ext>__X__</ext> tail __X__</part></whole>",
            &WHOLE,
        )
        .expect("parse");
        let out = doc.substitute(&Upper);
        assert_eq!(
            out.to_xml(),
            "<whole><part>done<ext>__X__</ext> tail done</part></whole>"
        );
    }
}
