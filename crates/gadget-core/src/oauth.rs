//! OAuth service descriptors declared under `ModulePrefs/OAuth`.

use gadget_xml::{Element, ParseError};

use crate::schema::{ACCESS, AUTHORIZATION, REQUEST, SERVICE};

/// HTTP method used to reach an OAuth endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("get") {
            Some(Method::Get)
        } else if value.eq_ignore_ascii_case("post") {
            Some(Method::Post)
        } else {
            None
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("method") {
            None => Ok(Method::Get),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!(
                    "{}@method value '{raw}' is unknown",
                    element.local_name()
                ))
            }),
        }
    }
}

/// Where OAuth parameters travel in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamLocation {
    /// `Authorization` header.
    #[default]
    Header,
    /// Query string.
    Url,
    /// Form-encoded request body.
    Body,
}

impl ParamLocation {
    /// Accepts the canonical names and the `auth-header`, `uri-query` and
    /// `post-body` aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" | "auth-header" => Some(ParamLocation::Header),
            "url" | "uri-query" => Some(ParamLocation::Url),
            "body" | "post-body" => Some(ParamLocation::Body),
            _ => None,
        }
    }

    pub(crate) fn from_attr(element: &Element) -> Result<Self, ParseError> {
        match element.attr("param_location") {
            None => Ok(ParamLocation::Header),
            Some(raw) => Self::parse(raw).ok_or_else(|| {
                ParseError::Invalid(format!(
                    "{}@param_location value '{raw}' is unknown",
                    element.local_name()
                ))
            }),
        }
    }
}

/// The `OAuth` section.
#[derive(Debug, Clone, Copy)]
pub struct OAuthSpec<'a> {
    element: &'a Element,
}

impl<'a> OAuthSpec<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn services(&self) -> impl Iterator<Item = OAuthService<'a>> + 'a {
        self.element.children_of(&SERVICE).map(OAuthService::new)
    }

    pub fn service(&self, name: &str) -> Option<OAuthService<'a>> {
        self.services().find(|service| service.name() == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OAuthService<'a> {
    element: &'a Element,
}

impl<'a> OAuthService<'a> {
    fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    /// Request-token endpoint.
    pub fn request(&self) -> Option<OAuthEndpoint<'a>> {
        self.element.first_child(&REQUEST).map(OAuthEndpoint::new)
    }

    /// Access-token endpoint.
    pub fn access(&self) -> Option<OAuthEndpoint<'a>> {
        self.element.first_child(&ACCESS).map(OAuthEndpoint::new)
    }

    pub fn authorization(&self) -> Option<OAuthAuthorization<'a>> {
        self.element
            .first_child(&AUTHORIZATION)
            .map(|element| OAuthAuthorization { element })
    }
}

/// A `Request` or `Access` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct OAuthEndpoint<'a> {
    element: &'a Element,
}

impl<'a> OAuthEndpoint<'a> {
    fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn url(&self) -> &'a str {
        self.element.attr("url").unwrap_or_default()
    }

    pub fn method(&self) -> Method {
        Method::from_attr(self.element).unwrap_or_default()
    }

    pub fn param_location(&self) -> ParamLocation {
        ParamLocation::from_attr(self.element).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OAuthAuthorization<'a> {
    element: &'a Element,
}

impl<'a> OAuthAuthorization<'a> {
    pub fn url(&self) -> &'a str {
        self.element.attr("url").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OAUTH;

    fn oauth(xml: &str) -> Result<Element, ParseError> {
        gadget_xml::parse_str(xml, &OAUTH)
    }

    #[test]
    fn location_aliases_are_accepted() {
        for (raw, expected) in [
            ("auth-header", ParamLocation::Header),
            (" URI-query ", ParamLocation::Url),
            ("post-body", ParamLocation::Body),
            ("Body", ParamLocation::Body),
        ] {
            assert_eq!(ParamLocation::parse(raw), Some(expected), "{raw}");
        }
        assert_eq!(ParamLocation::parse("cookie"), None);
    }

    #[test]
    fn services_expose_their_endpoints() {
        let element = oauth(
            r#"<OAuth><Service name="google">
                 <Request url="http://r/" method="POST" param_location="uri-query"/>
                 <Access url="http://a/" method="post" param_location="url"/>
                 <Authorization url="http://z/"/>
               </Service></OAuth>"#,
        )
        .expect("parse");
        let spec = OAuthSpec::new(&element);
        let service = spec.service("google").expect("service");
        let request = service.request().expect("request");
        assert_eq!(request.url(), "http://r/");
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.param_location(), ParamLocation::Url);
        assert_eq!(service.authorization().map(|a| a.url()), Some("http://z/"));
    }

    #[test]
    fn get_with_body_parameters_is_invalid() {
        let err = oauth(
            r#"<OAuth><Service name="s">
                 <Request url="http://r/" param_location="post-body"/>
                 <Access url="http://a/" param_location="post-body"/>
                 <Authorization url="http://z/"/>
               </Service></OAuth>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn invalid_method_is_rejected() {
        let err = oauth(
            r#"<OAuth><Service name="s">
                 <Request url="http://r/" method="PUT"/>
                 <Access url="http://a/"/>
                 <Authorization url="http://z/"/>
               </Service></OAuth>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn service_needs_every_endpoint() {
        let err = oauth(
            r#"<OAuth><Service name="s"><Request url="http://r/"/><Access url="http://a/"/></Service></OAuth>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn request_and_access_must_agree() {
        let err = oauth(
            r#"<OAuth><Service name="s">
                 <Request url="http://r/" method="POST"/>
                 <Access url="http://a/"/>
                 <Authorization url="http://z/"/>
               </Service></OAuth>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }
}
