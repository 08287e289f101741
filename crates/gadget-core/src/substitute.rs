//! Hangman placeholder substitution (`__MSG_key__`, `__UP_name__`, ...).

use std::collections::HashMap;

use gadget_xml::Substituter;
use url::Url;

use crate::bundle::{Direction, MessageBundle};
use crate::values::resolve;

/// Placeholder families, each with its own token prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstitutionType {
    /// Localized messages: `__MSG_key__`.
    Message,
    /// User preference values: `__UP_name__`.
    UserPref,
    /// Text direction helpers: `__BIDI_START_EDGE__` and friends.
    Bidi,
    /// Module instance data: `__MODULE_ID__`.
    Module,
}

impl SubstitutionType {
    const ALL: [SubstitutionType; 4] = [
        SubstitutionType::Message,
        SubstitutionType::UserPref,
        SubstitutionType::Bidi,
        SubstitutionType::Module,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            SubstitutionType::Message => "MSG_",
            SubstitutionType::UserPref => "UP_",
            SubstitutionType::Bidi => "BIDI_",
            SubstitutionType::Module => "MODULE_",
        }
    }
}

/// Replacement table for one render request.
///
/// Tokens without an entry are left exactly as written. Replacement values
/// are inserted as-is and never scanned for further tokens.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    base: Option<Url>,
    values: HashMap<SubstitutionType, HashMap<String, String>>,
}

const DELIMITER: &str = "__";

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table whose URI fields resolve against `base`.
    pub fn with_base(base: Url) -> Self {
        Self {
            base: Some(base),
            values: HashMap::new(),
        }
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    pub fn add(
        &mut self,
        kind: SubstitutionType,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.values
            .entry(kind)
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn add_all<K, V>(
        &mut self,
        kind: SubstitutionType,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.values.entry(kind).or_default();
        table.extend(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Register every message of `bundle`.
    pub fn add_messages(&mut self, bundle: &MessageBundle) -> &mut Self {
        self.add_all(
            SubstitutionType::Message,
            bundle
                .messages()
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    /// Register the `__BIDI_*__` values for `direction`.
    pub fn add_bidi(&mut self, direction: Direction) -> &mut Self {
        self.add_all(
            SubstitutionType::Bidi,
            [
                ("START_EDGE", direction.start_edge().to_string()),
                ("END_EDGE", direction.end_edge().to_string()),
                ("DIR", direction.to_string()),
                ("REVERSE_DIR", direction.reverse().to_string()),
            ],
        )
    }

    pub fn get(&self, kind: SubstitutionType, name: &str) -> Option<&str> {
        self.values.get(&kind)?.get(name).map(String::as_str)
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        SubstitutionType::ALL.iter().find_map(|kind| {
            let name = token.strip_prefix(kind.prefix())?;
            self.get(*kind, name)
        })
    }

    /// Replace every known token in `input`.
    pub fn substitute_string(&self, input: &str) -> String {
        if !input.contains(DELIMITER) {
            return input.to_string();
        }
        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find(DELIMITER) {
            output.push_str(&rest[..start]);
            let after_open = &rest[start + DELIMITER.len()..];
            let Some(end) = after_open.find(DELIMITER) else {
                output.push_str(&rest[start..]);
                return output;
            };
            let token = &after_open[..end];
            match self.lookup(token) {
                Some(value) => {
                    output.push_str(value);
                    rest = &after_open[end + DELIMITER.len()..];
                }
                None => {
                    // Keep the opening delimiter and rescan from the closing
                    // one, which may open the next token.
                    output.push_str(DELIMITER);
                    output.push_str(token);
                    rest = &after_open[end..];
                }
            }
        }
        output.push_str(rest);
        output
    }

    /// Replace tokens, then resolve the result against the base URI.
    pub fn substitute_uri(&self, input: &str) -> String {
        let value = self.substitute_string(input);
        match &self.base {
            Some(base) if !value.trim().is_empty() => resolve(base, &value),
            _ => value,
        }
    }
}

impl Substituter for Substitutions {
    fn substitute_text(&self, value: &str) -> String {
        self.substitute_string(value)
    }

    fn substitute_uri(&self, value: &str) -> String {
        Substitutions::substitute_uri(self, value)
    }
}
