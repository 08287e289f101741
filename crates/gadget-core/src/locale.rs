use std::fmt;
use std::str::FromStr;

use gadget_xml::ParseError;

/// Wildcard language.
pub const ALL_LANGUAGES: &str = "all";
/// Wildcard country.
pub const ALL_COUNTRIES: &str = "ALL";

/// A language/country pair. Language is kept lowercase and country uppercase,
/// so `all`/`ALL` act as wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    pub fn new(language: &str, country: &str) -> Self {
        let language = language.trim();
        let country = country.trim();
        Self {
            language: if language.is_empty() {
                ALL_LANGUAGES.to_string()
            } else {
                language.to_ascii_lowercase()
            },
            country: if country.is_empty() {
                ALL_COUNTRIES.to_string()
            } else {
                country.to_ascii_uppercase()
            },
        }
    }

    /// The terminal `all_ALL` locale.
    pub fn all() -> Self {
        Self::new(ALL_LANGUAGES, ALL_COUNTRIES)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn is_all(&self) -> bool {
        self.language == ALL_LANGUAGES
    }

    /// Next broader locale in the fallback chain:
    /// `en_US` → `en_ALL` → `all_ALL` → none.
    pub fn parent(&self) -> Option<Locale> {
        if self.is_all() {
            None
        } else if self.country == ALL_COUNTRIES {
            Some(Locale::all())
        } else {
            Some(Locale::new(&self.language, ALL_COUNTRIES))
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.language, self.country)
    }
}

/// Parses `en_US`, `en-US`, `en` or an empty string (`all_ALL`).
impl FromStr for Locale {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().splitn(2, |c: char| c == '_' || c == '-');
        let language = parts.next().unwrap_or_default();
        let country = parts.next().unwrap_or_default();
        let valid = |part: &str| part.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(language) || !valid(country) {
            return Err(ParseError::Invalid(format!("invalid locale '{value}'")));
        }
        Ok(Locale::new(language, country))
    }
}
