//! The parsed gadget document.

use std::collections::BTreeMap;

use gadget_xml::{Element, ParseError};
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::content::Content;
use crate::module_prefs::ModulePrefs;
use crate::schema::{CONTENT, MODULE, MODULE_PREFS, USER_PREF};
use crate::substitute::Substitutions;
use crate::user_pref::UserPref;
use crate::view::{fold_views, View};

/// Minimal document served in place of a gadget that could not be loaded.
pub const ERROR_PLACEHOLDER: &str = "<Module><ModulePrefs title='Error'/><Content/></Module>";

/// An immutable, validated gadget specification.
///
/// Produced by [`Specification::parse`]; [`Specification::substitute`] builds
/// request-scoped copies and never touches the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    url: Url,
    checksum: String,
    root: Element,
    prefs_index: usize,
    views: BTreeMap<String, View>,
}

impl Specification {
    /// Parse and validate the document fetched from `url`.
    pub fn parse(url: Url, xml: &str) -> Result<Self, ParseError> {
        let root = gadget_xml::parse_str(xml, &MODULE)?;
        Self::from_root(url, checksum(xml), root)
    }

    /// The single-view placeholder used to render a failed gadget.
    pub fn error_placeholder(url: Url) -> Result<Self, ParseError> {
        Self::parse(url, ERROR_PLACEHOLDER)
    }

    fn from_root(url: Url, checksum: String, root: Element) -> Result<Self, ParseError> {
        let prefs_index = root
            .children()
            .iter()
            .position(|child| child.is(&MODULE_PREFS))
            .ok_or_else(|| ParseError::Invalid("Module has no ModulePrefs section".into()))?;
        let views = fold_views(root.children_of(&CONTENT))?;
        debug!(url = %url, views = views.len(), "parsed gadget specification");
        Ok(Self {
            url,
            checksum,
            root,
            prefs_index,
            views,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Hex SHA-256 digest of the raw source.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// The underlying `Module` element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn module_prefs(&self) -> ModulePrefs<'_> {
        ModulePrefs::new(&self.root.children()[self.prefs_index])
    }

    pub fn user_prefs(&self) -> impl Iterator<Item = UserPref<'_>> + '_ {
        self.root.children_of(&USER_PREF).map(UserPref::new)
    }

    pub fn user_pref(&self, name: &str) -> Option<UserPref<'_>> {
        self.user_prefs().find(|pref| pref.name() == name)
    }

    /// `Content` sections in document order.
    pub fn contents(&self) -> impl Iterator<Item = Content<'_>> + '_ {
        self.root.children_of(&CONTENT).map(Content::new)
    }

    pub fn views(&self) -> &BTreeMap<String, View> {
        &self.views
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    /// Request-scoped copy with every substitutable field rewritten.
    pub fn substitute(&self, substitutions: &Substitutions) -> Specification {
        Specification {
            url: self.url.clone(),
            checksum: self.checksum.clone(),
            root: self.root.substitute(substitutions),
            prefs_index: self.prefs_index,
            views: self
                .views
                .iter()
                .map(|(name, view)| (name.clone(), view.substitute(substitutions)))
                .collect(),
        }
    }

    /// Serialize the document back to XML.
    pub fn to_xml(&self) -> String {
        self.root.to_xml()
    }
}

fn checksum(source: &str) -> String {
    Sha256::digest(source.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitute::SubstitutionType;
    use crate::ContentType;

    const GADGET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Module>
  <ModulePrefs title="__MSG_title__" title_url="about.html" author="ada">
    <Require feature="opensocial-0.8"/>
    <Locale lang="en" messages="en.xml"/>
  </ModulePrefs>
  <UserPref name="color" display_name="__MSG_color__" default_value="red"/>
  <Content type="html" view="home,canvas"><![CDATA[<b>__UP_color__</b>]]></Content>
  <Content type="html" view="canvas">__MSG_more__</Content>
  <Content type="url" view="profile" href="profile/__UP_color__.html"/>
</Module>"#;

    fn url() -> Url {
        Url::parse("http://example.org/gadgets/spec.xml").expect("url")
    }

    #[test]
    fn parses_full_document() {
        let spec = Specification::parse(url(), GADGET).expect("parse");
        assert_eq!(spec.module_prefs().title(), "__MSG_title__");
        assert_eq!(spec.module_prefs().author(), Some("ada"));
        assert_eq!(spec.user_prefs().count(), 1);
        assert_eq!(spec.contents().count(), 3);
        assert_eq!(spec.view("canvas").map(View::content), Some("<b>__UP_color__</b>__MSG_more__"));
        assert_eq!(spec.view("profile").map(View::content_type), Some(ContentType::Url));
        assert!(spec.view("missing").is_none());
        assert_eq!(spec.checksum().len(), 64);
    }

    #[test]
    fn missing_module_prefs_is_an_error() {
        let err = Specification::parse(url(), r#"<Module><Content type="html"/></Module>"#).unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn duplicate_module_prefs_is_an_error() {
        let err = Specification::parse(
            url(),
            r#"<Module><ModulePrefs title="a"/><ModulePrefs title="b"/><Content/></Module>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn missing_content_is_an_error() {
        assert!(Specification::parse(url(), r#"<Module><ModulePrefs title="a"/></Module>"#).is_err());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = Specification::parse(url(), "<Module><ModulePrefs title='x'>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. } | ParseError::Xml(_)));
    }

    #[test]
    fn wrong_root_is_an_error() {
        let err = Specification::parse(url(), "<Gadget/>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot { .. }));
    }

    #[test]
    fn error_placeholder_has_one_empty_view() {
        let spec = Specification::error_placeholder(url()).expect("placeholder");
        assert_eq!(spec.module_prefs().title(), "Error");
        assert_eq!(spec.views().len(), 1);
        assert_eq!(spec.view("default").map(View::content), Some(""));
    }

    #[test]
    fn round_trip_preserves_structure() {
        let xml = r#"<Module xmlns:conf="urn:conf">
  <ModulePrefs title="t" conf:extra="1" unknown="u"><conf:foo conf:blo="blu" bar="baz">content</conf:foo></ModulePrefs>
  <Content><![CDATA[<i>x</i>]]></Content>
  <Extension><Nested a="b"/></Extension>
</Module>"#;
        let spec = Specification::parse(url(), xml).expect("parse");
        let again = Specification::parse(url(), &spec.to_xml()).expect("reparse");
        assert_eq!(again.root(), spec.root());
        assert_eq!(again.views(), spec.views());
    }

    #[test]
    fn mixed_content_in_extensions_round_trips_verbatim() {
        let xml = r#"<Module><ModulePrefs title="t"/><ext>before<b/>after<c>x</c>!</ext><Content/></Module>"#;
        let spec = Specification::parse(url(), xml).expect("parse");
        assert_eq!(spec.to_xml(), xml);
        let again = Specification::parse(url(), &spec.to_xml()).expect("reparse");
        assert_eq!(again.root(), spec.root());
    }

    #[test]
    fn deeply_nested_extensions_are_rejected() {
        let xml = format!(
            r#"<Module><ModulePrefs title="t"/><Content>x</Content>{}{}</Module>"#,
            "<x>".repeat(5_000),
            "</x>".repeat(5_000)
        );
        let err = Specification::parse(url(), &xml).unwrap_err();
        assert_eq!(err, ParseError::Invalid("document nested too deeply".into()));
    }

    #[test]
    fn undeclared_prefix_survives_round_trip() {
        let xml = r#"<Module><ModulePrefs title="t"><conf:foo conf:blo="blu" bar="baz">content</conf:foo></ModulePrefs><Content/></Module>"#;
        let spec = Specification::parse(url(), xml).expect("parse");
        let again = Specification::parse(url(), &spec.to_xml()).expect("reparse");
        assert_eq!(again.root(), spec.root());
        let foo = &again.module_prefs().element().children()[0];
        assert_eq!(foo.name().to_string(), "conf:foo");
        assert_eq!(foo.text(), "content");
    }

    #[test]
    fn substitution_is_pure_and_repeatable() {
        let spec = Specification::parse(url(), GADGET).expect("parse");
        let before = spec.clone();
        let mut subs = Substitutions::with_base(spec.url().clone());
        subs.add(SubstitutionType::Message, "title", "Hello")
            .add(SubstitutionType::Message, "more", " more")
            .add(SubstitutionType::UserPref, "color", "blue");

        let first = spec.substitute(&subs);
        let second = spec.substitute(&subs);
        assert_eq!(spec, before);
        assert_eq!(first, second);

        assert_eq!(first.module_prefs().title(), "Hello");
        assert_eq!(
            first.module_prefs().title_url(),
            Some("http://example.org/gadgets/about.html")
        );
        assert_eq!(first.user_pref("color").map(|p| p.display_name()), Some("__MSG_color__"));
        assert_eq!(first.view("canvas").map(View::content), Some("<b>blue</b> more"));
        assert_eq!(
            first.view("profile").and_then(View::href),
            Some("http://example.org/gadgets/profile/blue.html")
        );
        assert_eq!(first.checksum(), spec.checksum());
        assert_eq!(first.contents().next().map(|c| c.body()), Some("<b>blue</b>"));
    }
}
