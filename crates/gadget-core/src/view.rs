//! Views: the merged rendering targets derived from `Content` sections.

use std::collections::BTreeMap;

use gadget_xml::{Element, ParseError, Substituter};

use crate::content::{AuthType, Content, ContentType};

/// A named rendering target folded from every `Content` section that lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    name: String,
    content_type: ContentType,
    raw_type: Option<String>,
    href: Option<String>,
    content: String,
    preferred_height: Option<u32>,
    preferred_width: Option<u32>,
    auth_type: AuthType,
    sign_owner: bool,
    sign_viewer: bool,
    quirks: bool,
}

impl View {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            content_type: ContentType::Html,
            raw_type: None,
            href: None,
            content: String::new(),
            preferred_height: None,
            preferred_width: None,
            auth_type: AuthType::None,
            sign_owner: true,
            sign_viewer: true,
            quirks: false,
        }
    }

    /// Merge the next `Content` section for this view.
    fn apply(&mut self, section: Content<'_>) -> Result<(), ParseError> {
        match section.content_type() {
            ContentType::Html => {
                if let Some(href) = &self.href {
                    return Err(ParseError::Invalid(format!(
                        "view '{}' mixes inline HTML with url content '{href}'",
                        self.name
                    )));
                }
                self.content.push_str(section.body());
                self.content_type = ContentType::Html;
            }
            ContentType::Url => {
                if !self.content.is_empty() {
                    return Err(ParseError::Invalid(format!(
                        "view '{}' mixes url content with inline HTML",
                        self.name
                    )));
                }
                self.href = section.href().map(str::to_string);
                self.content_type = ContentType::Url;
            }
        }
        if let Some(raw) = section.raw_type() {
            self.raw_type = Some(raw.to_string());
        }
        if let Some(height) = section.preferred_height() {
            self.preferred_height = Some(height);
        }
        if let Some(width) = section.preferred_width() {
            self.preferred_width = Some(width);
        }
        if let Some(auth) = section.auth_type() {
            self.auth_type = auth;
        }
        if let Some(sign) = section.sign_owner() {
            self.sign_owner = sign;
        }
        if let Some(sign) = section.sign_viewer() {
            self.sign_viewer = sign;
        }
        if section.element().attr("quirks").is_some() {
            self.quirks = section.quirks();
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Last explicitly declared `type` attribute.
    pub fn raw_type(&self) -> Option<&str> {
        self.raw_type.as_deref()
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Concatenated inline HTML.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn preferred_height(&self) -> Option<u32> {
        self.preferred_height
    }

    pub fn preferred_width(&self) -> Option<u32> {
        self.preferred_width
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn sign_owner(&self) -> bool {
        self.sign_owner
    }

    pub fn sign_viewer(&self) -> bool {
        self.sign_viewer
    }

    pub fn quirks(&self) -> bool {
        self.quirks
    }

    /// Copy with the body and `href` rewritten.
    pub fn substitute(&self, substituter: &dyn Substituter) -> View {
        View {
            content: substituter.substitute_text(&self.content),
            href: self.href.as_deref().map(|href| substituter.substitute_uri(href)),
            ..self.clone()
        }
    }
}

/// Group `Content` elements by view name and fold each group in document
/// order.
pub fn fold_views<'a>(
    contents: impl IntoIterator<Item = &'a Element>,
) -> Result<BTreeMap<String, View>, ParseError> {
    let mut views: BTreeMap<String, View> = BTreeMap::new();
    for element in contents {
        let section = Content::new(element);
        for name in section.views() {
            views
                .entry(name.to_string())
                .or_insert_with(|| View::empty(name))
                .apply(section)?;
        }
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONTENT, MODULE};

    fn views(xml: &str) -> Result<BTreeMap<String, View>, ParseError> {
        let module = gadget_xml::parse_str(xml, &MODULE)?;
        fold_views(module.children_of(&CONTENT))
    }

    #[test]
    fn sections_merge_per_view() {
        let views = views(
            r#"<Module><ModulePrefs title="t"/>
                 <Content view="a,b">X</Content>
                 <Content view="b" preferred_height="40">Y</Content>
               </Module>"#,
        )
        .expect("views");
        assert_eq!(views["b"].content(), "XY");
        assert_eq!(views["a"].content(), "X");
        assert_eq!(views["b"].preferred_height(), Some(40));
        assert_eq!(views["a"].preferred_height(), None);
    }

    #[test]
    fn unnamed_sections_land_in_the_default_view() {
        let views = views(
            r#"<Module><ModulePrefs title="t"/><Content>hello </Content><Content><![CDATA[test]]></Content></Module>"#,
        )
        .expect("views");
        assert_eq!(views["default"].content(), "hello test");
    }

    #[test]
    fn whitespace_between_sections_is_kept() {
        let views = views(
            r#"<Module><ModulePrefs title="t"/><Content><![CDATA[__MSG_a__]]> <![CDATA[__MSG_b__]]></Content></Module>"#,
        )
        .expect("views");
        assert_eq!(views["default"].content(), "__MSG_a__ __MSG_b__");
    }

    #[test]
    fn url_then_html_is_rejected() {
        let err = views(
            r#"<Module><ModulePrefs title="t"/>
                 <Content type="url" href="http://example.org/g"/>
                 <Content>inline</Content>
               </Module>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn html_then_url_is_rejected() {
        let err = views(
            r#"<Module><ModulePrefs title="t"/>
                 <Content>inline</Content>
                 <Content type="url" href="http://example.org/g"/>
               </Module>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn later_sections_override_flags() {
        let views = views(
            r#"<Module><ModulePrefs title="t"/>
                 <Content type="url" href="http://a/" authz="signed" sign_owner="false"/>
                 <Content type="url" href="http://b/" authz="oauth"/>
               </Module>"#,
        )
        .expect("views");
        let view = &views["default"];
        assert_eq!(view.href(), Some("http://b/"));
        assert_eq!(view.auth_type(), AuthType::OAuth);
        assert!(!view.sign_owner());
        assert!(view.sign_viewer());
    }
}
