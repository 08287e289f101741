//! Localized message tables.

use std::collections::BTreeMap;
use std::fmt;

use gadget_xml::{Element, ParseError};

use crate::schema::{MESSAGE_BUNDLE, MSG};

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Lenient parse; anything other than `rtl` reads as left-to-right.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("rtl") {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }

    /// Edge text starts from: `left` or `right`.
    pub fn start_edge(self) -> &'static str {
        match self {
            Direction::Ltr => "left",
            Direction::Rtl => "right",
        }
    }

    pub fn end_edge(self) -> &'static str {
        self.reverse().start_edge()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        })
    }
}

/// Immutable message table with an optional explicit direction.
///
/// A bundle that never declared a direction inherits its parent's when merged
/// and reads as left-to-right on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBundle {
    messages: BTreeMap<String, String>,
    direction: Option<Direction>,
}

impl MessageBundle {
    pub fn new(messages: BTreeMap<String, String>, direction: Option<Direction>) -> Self {
        Self {
            messages,
            direction,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse an external `messagebundle` document.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let root = gadget_xml::parse_str(xml, &MESSAGE_BUNDLE)?;
        Ok(Self::from_element(&root))
    }

    /// Collect the `msg` children of a `messagebundle` or `Locale` element.
    pub(crate) fn from_element(element: &Element) -> Self {
        let messages = element
            .children_of(&MSG)
            .filter_map(|msg| Some((msg.attr("name")?.to_string(), msg.text().to_string())))
            .collect();
        let direction = element.attr("language_direction").map(Direction::parse);
        Self::new(messages, direction)
    }

    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    /// New bundle with `child` layered over `self`: child entries win and the
    /// child's direction is adopted when it declares one.
    pub fn merge(&self, child: &MessageBundle) -> MessageBundle {
        let mut messages = self.messages.clone();
        messages.extend(
            child
                .messages
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        MessageBundle {
            messages,
            direction: child.direction.or(self.direction),
        }
    }
}
