//! Typed access to `ModulePrefs` and its children.

use std::collections::BTreeMap;
use std::fmt;

use gadget_xml::{Element, ParseError};
use url::Url;

use crate::bundle::{Direction, MessageBundle};
use crate::content::AuthType;
use crate::locale::{Locale, ALL_COUNTRIES, ALL_LANGUAGES};
use crate::oauth::OAuthSpec;
use crate::schema::{ICON, LINK, LOCALE, MSG, OAUTH, OPTIONAL, PARAM, PRELOAD, REQUIRE};
use crate::values::{flag, list, number, resolve};

/// The `ModulePrefs` section of a gadget.
#[derive(Debug, Clone, Copy)]
pub struct ModulePrefs<'a> {
    element: &'a Element,
}

impl<'a> ModulePrefs<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Any recognized attribute by name.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    pub fn title(&self) -> &'a str {
        self.attr("title").unwrap_or_default()
    }

    pub fn title_url(&self) -> Option<&'a str> {
        self.attr("title_url")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.attr("description")
    }

    pub fn author(&self) -> Option<&'a str> {
        self.attr("author")
    }

    pub fn author_email(&self) -> Option<&'a str> {
        self.attr("author_email")
    }

    pub fn screenshot(&self) -> Option<&'a str> {
        self.attr("screenshot")
    }

    pub fn thumbnail(&self) -> Option<&'a str> {
        self.attr("thumbnail")
    }

    pub fn directory_title(&self) -> Option<&'a str> {
        self.attr("directory_title")
    }

    pub fn categories(&self) -> Vec<&'a str> {
        ["category", "category2"]
            .into_iter()
            .filter_map(|name| self.attr(name))
            .filter(|value| !value.trim().is_empty())
            .collect()
    }

    pub fn width(&self) -> Option<u32> {
        number(self.element, "width")
    }

    pub fn height(&self) -> Option<u32> {
        number(self.element, "height")
    }

    pub fn scrolling(&self) -> bool {
        flag(self.element, "scrolling", false)
    }

    pub fn scaling(&self) -> bool {
        flag(self.element, "scaling", true)
    }

    pub fn singleton(&self) -> bool {
        flag(self.element, "singleton", true)
    }

    pub fn show_stats(&self) -> bool {
        flag(self.element, "show_stats", false)
    }

    pub fn show_in_directory(&self) -> bool {
        flag(self.element, "show_in_directory", false)
    }

    /// `Require` and `Optional` entries in document order.
    pub fn features(&self) -> impl Iterator<Item = Feature<'a>> + 'a {
        self.element
            .children()
            .iter()
            .filter(|child| child.is(&REQUIRE) || child.is(&OPTIONAL))
            .map(Feature::new)
    }

    /// Feature entry by name.
    pub fn feature(&self, name: &str) -> Option<Feature<'a>> {
        self.features().find(|feature| feature.name() == name)
    }

    pub fn preloads(&self) -> impl Iterator<Item = Preload<'a>> + 'a {
        self.element
            .children_of(&PRELOAD)
            .map(|element| Preload { element })
    }

    pub fn icons(&self) -> impl Iterator<Item = Icon<'a>> + 'a {
        self.element
            .children_of(&ICON)
            .map(|element| Icon { element })
    }

    pub fn links(&self) -> impl Iterator<Item = Link<'a>> + 'a {
        self.element
            .children_of(&LINK)
            .map(|element| Link { element })
    }

    /// First link declared for `rel`.
    pub fn link(&self, rel: LinkRel) -> Option<Link<'a>> {
        self.links().find(|link| link.rel() == rel)
    }

    pub fn locales(&self) -> impl Iterator<Item = LocaleSpec<'a>> + 'a {
        self.element
            .children_of(&LOCALE)
            .map(|element| LocaleSpec { element })
    }

    /// Locale section declared for exactly `locale`.
    pub fn locale(&self, locale: &Locale) -> Option<LocaleSpec<'a>> {
        self.locales().find(|spec| spec.locale() == *locale)
    }

    pub fn oauth(&self) -> Option<OAuthSpec<'a>> {
        self.element.first_child(&OAUTH).map(OAuthSpec::new)
    }
}

/// A `Require` or `Optional` feature dependency.
#[derive(Debug, Clone, Copy)]
pub struct Feature<'a> {
    element: &'a Element,
}

impl<'a> Feature<'a> {
    fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn name(&self) -> &'a str {
        self.element.attr("feature").unwrap_or_default()
    }

    /// `true` for `Require`, `false` for `Optional`.
    pub fn is_required(&self) -> bool {
        self.element.is(&REQUIRE)
    }

    /// `Param` values by name; a later duplicate replaces an earlier one.
    pub fn params(&self) -> BTreeMap<&'a str, &'a str> {
        self.element
            .children_of(&PARAM)
            .filter_map(|param| Some((param.attr("name")?, param.text())))
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params().get(name).copied()
    }
}

/// A `Preload` request issued alongside rendering.
#[derive(Debug, Clone, Copy)]
pub struct Preload<'a> {
    element: &'a Element,
}

impl<'a> Preload<'a> {
    pub fn href(&self) -> &'a str {
        self.element.attr("href").unwrap_or_default()
    }

    pub fn auth_type(&self) -> AuthType {
        AuthType::from_attr(self.element).unwrap_or_default()
    }

    pub fn sign_owner(&self) -> bool {
        flag(self.element, "sign_owner", true)
    }

    pub fn sign_viewer(&self) -> bool {
        flag(self.element, "sign_viewer", true)
    }

    /// Views the preload applies to; empty means every view.
    pub fn views(&self) -> Vec<&'a str> {
        list(self.element, "views")
    }

    pub fn oauth_service_name(&self) -> Option<&'a str> {
        self.element.attr("oauth_service_name")
    }

    pub fn oauth_token_name(&self) -> Option<&'a str> {
        self.element.attr("oauth_token_name")
    }

    pub fn oauth_request_token(&self) -> Option<&'a str> {
        self.element.attr("oauth_request_token")
    }

    pub fn oauth_request_token_secret(&self) -> Option<&'a str> {
        self.element.attr("oauth_request_token_secret")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Icon<'a> {
    element: &'a Element,
}

impl<'a> Icon<'a> {
    pub fn mode(&self) -> Option<&'a str> {
        self.element.attr("mode")
    }

    pub fn icon_type(&self) -> Option<&'a str> {
        self.element.attr("type")
    }

    /// URL or inline (for example base64) payload.
    pub fn content(&self) -> &'a str {
        self.element.text().trim()
    }
}

/// Relation of a `Link` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkRel {
    Help,
    Support,
    #[default]
    Icon,
}

impl LinkRel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gadgets.help" => Some(LinkRel::Help),
            "gadgets.support" => Some(LinkRel::Support),
            "icon" => Some(LinkRel::Icon),
            _ => None,
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("rel") {
            None => Ok(LinkRel::Icon),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!("Link@rel value '{raw}' is unknown"))
            }),
        }
    }
}

impl fmt::Display for LinkRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkRel::Help => "gadgets.help",
            LinkRel::Support => "gadgets.support",
            LinkRel::Icon => "icon",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Link<'a> {
    element: &'a Element,
}

impl<'a> Link<'a> {
    pub fn rel(&self) -> LinkRel {
        LinkRel::from_attr(self.element).unwrap_or_default()
    }

    pub fn href(&self) -> &'a str {
        self.element.attr("href").unwrap_or_default()
    }

    pub fn method(&self) -> Option<&'a str> {
        self.element.attr("method")
    }
}

/// A `Locale` section: where the messages of one locale come from.
#[derive(Debug, Clone, Copy)]
pub struct LocaleSpec<'a> {
    element: &'a Element,
}

impl<'a> LocaleSpec<'a> {
    pub fn locale(&self) -> Locale {
        Locale::new(
            self.element.attr("lang").unwrap_or(ALL_LANGUAGES),
            self.element.attr("country").unwrap_or(ALL_COUNTRIES),
        )
    }

    /// Declared `language_direction`, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.element.attr("language_direction").map(Direction::parse)
    }

    /// `messages` exactly as written.
    pub fn messages(&self) -> Option<&'a str> {
        self.element.attr("messages")
    }

    /// External bundle location resolved against the gadget URL.
    pub fn messages_url(&self, base: &Url) -> Option<Url> {
        let raw = self.messages()?;
        Url::parse(&resolve(base, raw)).ok()
    }

    pub fn msgs(&self) -> impl Iterator<Item = LocaleMsg<'a>> + 'a {
        self.element
            .children_of(&MSG)
            .map(|element| LocaleMsg { element })
    }

    /// Messages declared inline, with this section's direction.
    pub fn inline_bundle(&self) -> MessageBundle {
        MessageBundle::from_element(self.element)
    }
}

/// A single `msg` entry.
#[derive(Debug, Clone, Copy)]
pub struct LocaleMsg<'a> {
    element: &'a Element,
}

impl<'a> LocaleMsg<'a> {
    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    pub fn desc(&self) -> Option<&'a str> {
        self.element.attr("desc")
    }

    pub fn value(&self) -> &'a str {
        self.element.text()
    }
}
