//! XML serialization of element trees.

use std::fmt::{self, Write};

use quick_xml::escape::escape;

use crate::element::Element;

impl Element {
    /// Serialize the tree back to XML text.
    ///
    /// Namespace declarations come first, then recognized attributes in schema
    /// order, then unrecognized and foreign-namespace attributes as they were
    /// read. Text read from a CDATA section is written as CDATA again.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for decl in &self.namespaces {
            write_attribute(f, &decl.attribute_name(), &decl.uri)?;
        }
        if let Some(schema) = self.schema {
            for spec in schema.attributes {
                if let Some(value) = self.attributes.get(spec.name) {
                    write_attribute(f, spec.name, value)?;
                }
            }
        }
        for attr in self.other_attributes.iter().chain(&self.foreign_attributes) {
            write_attribute(f, &attr.name.to_string(), &attr.value)?;
        }

        if self.text.is_empty() && self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_char('>')?;
        let mut runs = self.text_runs();
        for child in &self.children {
            self.write_text(f, runs.next().unwrap_or_default())?;
            write!(f, "{child}")?;
        }
        self.write_text(f, runs.next().unwrap_or_default())?;
        write!(f, "</{}>", self.name)
    }
}

impl Element {
    fn write_text(&self, f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
        if text.is_empty() {
            Ok(())
        } else if self.cdata {
            write!(f, "<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
        } else {
            f.write_str(&escape(text))
        }
    }
}

fn write_attribute(f: &mut fmt::Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    write!(f, " {name}=\"{}\"", escape(value))
}
