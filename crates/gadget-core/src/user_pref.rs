use std::fmt;

use gadget_xml::{Element, ParseError};

use crate::schema::ENUM_VALUE;
use crate::values::{flag, number};

/// Declared type of a user preference (`datatype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    String,
    Hidden,
    Bool,
    Enum,
    List,
    Number,
}

impl DataType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "string" => Some(DataType::String),
            "hidden" => Some(DataType::Hidden),
            "bool" => Some(DataType::Bool),
            "enum" => Some(DataType::Enum),
            "list" => Some(DataType::List),
            "number" => Some(DataType::Number),
            _ => None,
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("datatype") {
            None => Ok(DataType::String),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!("UserPref@datatype value '{raw}' is unknown"))
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::String => "string",
            DataType::Hidden => "hidden",
            DataType::Bool => "bool",
            DataType::Enum => "enum",
            DataType::List => "list",
            DataType::Number => "number",
        })
    }
}

/// A `UserPref` declaration.
#[derive(Debug, Clone, Copy)]
pub struct UserPref<'a> {
    element: &'a Element,
}

impl<'a> UserPref<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    /// Label shown to users; falls back to the name.
    pub fn display_name(&self) -> &'a str {
        self.element.attr("display_name").unwrap_or_else(|| self.name())
    }

    pub fn default_value(&self) -> &'a str {
        self.element.attr("default_value").unwrap_or_default()
    }

    pub fn required(&self) -> bool {
        flag(self.element, "required", false)
    }

    pub fn data_type(&self) -> DataType {
        DataType::from_attr(self.element).unwrap_or_default()
    }

    pub fn url_param(&self) -> Option<&'a str> {
        self.element.attr("urlparam")
    }

    pub fn autocomplete_url(&self) -> Option<&'a str> {
        self.element.attr("autocomplete_url")
    }

    pub fn num_minval(&self) -> Option<f64> {
        number(self.element, "num_minval")
    }

    pub fn num_maxval(&self) -> Option<f64> {
        number(self.element, "num_maxval")
    }

    pub fn str_maxlen(&self) -> Option<usize> {
        number(self.element, "str_maxlen")
    }

    pub fn restrict_to_completions(&self) -> bool {
        flag(self.element, "restrict_to_completions", false)
    }

    pub fn prefix_match(&self) -> bool {
        flag(self.element, "prefix_match", false)
    }

    pub fn publish(&self) -> bool {
        flag(self.element, "publish", false)
    }

    pub fn listen(&self) -> bool {
        flag(self.element, "listen", false)
    }

    pub fn on_change(&self) -> Option<&'a str> {
        self.element.attr("on_change")
    }

    pub fn group(&self) -> Option<&'a str> {
        self.element.attr("group")
    }

    /// Choices of an `enum` preference, in document order.
    pub fn enum_values(&self) -> impl Iterator<Item = EnumValue<'a>> + 'a {
        self.element
            .children_of(&ENUM_VALUE)
            .map(|element| EnumValue { element })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnumValue<'a> {
    element: &'a Element,
}

impl<'a> EnumValue<'a> {
    pub fn value(&self) -> &'a str {
        self.element.attr("value").unwrap_or_default()
    }

    /// Label for the choice; defaults to the value.
    pub fn display_value(&self) -> &'a str {
        self.element
            .attr("display_value")
            .unwrap_or_else(|| self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::USER_PREF;

    fn pref(xml: &str) -> Result<Element, ParseError> {
        gadget_xml::parse_str(xml, &USER_PREF)
    }

    #[test]
    fn enum_preferences() {
        let element = pref(
            r#"<UserPref name="color" datatype="ENUM" default_value="red" required="true">
                 <EnumValue value="red" display_value="Red"/>
                 <EnumValue value="blue"/>
               </UserPref>"#,
        )
        .expect("parse");
        let pref = UserPref::new(&element);
        assert_eq!(pref.data_type(), DataType::Enum);
        assert_eq!(pref.display_name(), "color");
        assert!(pref.required());
        let values: Vec<_> = pref
            .enum_values()
            .map(|v| (v.value(), v.display_value()))
            .collect();
        assert_eq!(values, [("red", "Red"), ("blue", "blue")]);
    }

    #[test]
    fn unknown_datatype_is_rejected() {
        let err = pref(r#"<UserPref name="x" datatype="date"/>"#).unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn name_is_required() {
        assert!(pref(r#"<UserPref display_name="x"/>"#).is_err());
        assert!(pref(r#"<UserPref name="x"><EnumValue/></UserPref>"#).is_err());
    }

    #[test]
    fn numeric_bounds() {
        let element = pref(r#"<UserPref name="n" datatype="number" num_minval="1.5" str_maxlen="8"/>"#)
            .expect("parse");
        let pref = UserPref::new(&element);
        assert_eq!(pref.num_minval(), Some(1.5));
        assert_eq!(pref.num_maxval(), None);
        assert_eq!(pref.str_maxlen(), Some(8));
    }
}
