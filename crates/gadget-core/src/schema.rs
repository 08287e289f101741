//! Element schemas of the gadget vocabulary.
//!
//! Every element type is a static [`ElementSchema`]; the parser starts from
//! [`MODULE`] (or [`MESSAGE_BUNDLE`] for external bundle documents) and
//! follows the child tables from there.

use gadget_xml::{accept_any, AttributeSpec as A, Element, ElementSchema, ParseError, TextPolicy};

use crate::content::{AuthType, ContentType};
use crate::module_prefs::LinkRel;
use crate::oauth::{Method, ParamLocation};
use crate::user_pref::DataType;
use crate::values::{check_uri, required};
use crate::view::fold_views;

pub static MODULE: ElementSchema = ElementSchema {
    local_name: "Module",
    attributes: &[],
    children: &[&MODULE_PREFS, &USER_PREF, &CONTENT],
    text: TextPolicy::Forbidden,
    validate: validate_module,
};

pub static MODULE_PREFS: ElementSchema = ElementSchema {
    local_name: "ModulePrefs",
    attributes: &[
        A::text("title"),
        A::uri("title_url"),
        A::text("description"),
        A::text("author"),
        A::text("author_email"),
        A::uri("screenshot"),
        A::uri("thumbnail"),
        A::text("directory_title"),
        A::text("author_affiliation"),
        A::text("author_location"),
        A::uri("author_photo"),
        A::text("author_aboutme"),
        A::text("author_quote"),
        A::uri("author_link"),
        A::plain("show_stats"),
        A::plain("show_in_directory"),
        A::plain("singleton"),
        A::plain("scaling"),
        A::plain("scrolling"),
        A::plain("width"),
        A::plain("height"),
        A::text("category"),
        A::text("category2"),
        A::plain("render_inline"),
    ],
    children: &[
        &REQUIRE,
        &OPTIONAL,
        &PRELOAD,
        &ICON,
        &LINK,
        &LOCALE,
        &OAUTH,
    ],
    text: TextPolicy::Forbidden,
    validate: validate_module_prefs,
};

pub static REQUIRE: ElementSchema = ElementSchema {
    local_name: "Require",
    attributes: &[A::plain("feature")],
    children: &[&PARAM],
    text: TextPolicy::Forbidden,
    validate: validate_feature,
};

pub static OPTIONAL: ElementSchema = ElementSchema {
    local_name: "Optional",
    attributes: &[A::plain("feature")],
    children: &[&PARAM],
    text: TextPolicy::Forbidden,
    validate: validate_feature,
};

pub static PARAM: ElementSchema = ElementSchema {
    local_name: "Param",
    attributes: &[A::plain("name")],
    children: &[],
    text: TextPolicy::Trimmed,
    validate: validate_param,
};

pub static PRELOAD: ElementSchema = ElementSchema {
    local_name: "Preload",
    attributes: &[
        A::uri("href"),
        A::plain("authz"),
        A::plain("sign_owner"),
        A::plain("sign_viewer"),
        A::list("views"),
        A::plain("oauth_service_name"),
        A::plain("oauth_token_name"),
        A::plain("oauth_request_token"),
        A::plain("oauth_request_token_secret"),
    ],
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_preload,
};

pub static ICON: ElementSchema = ElementSchema {
    local_name: "Icon",
    attributes: &[A::plain("mode"), A::plain("type")],
    children: &[],
    text: TextPolicy::Accumulate { substitute: true },
    validate: accept_any,
};

pub static LINK: ElementSchema = ElementSchema {
    local_name: "Link",
    attributes: &[A::plain("rel"), A::uri("href"), A::plain("method")],
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_link,
};

pub static LOCALE: ElementSchema = ElementSchema {
    local_name: "Locale",
    attributes: &[
        A::plain("lang"),
        A::plain("country"),
        A::plain("language_direction"),
        A::plain("messages"),
    ],
    children: &[&MSG],
    text: TextPolicy::Forbidden,
    validate: validate_locale,
};

pub static MSG: ElementSchema = ElementSchema {
    local_name: "msg",
    attributes: &[A::plain("name"), A::plain("desc")],
    children: &[],
    text: TextPolicy::Accumulate { substitute: false },
    validate: validate_msg,
};

pub static OAUTH: ElementSchema = ElementSchema {
    local_name: "OAuth",
    attributes: &[],
    children: &[&SERVICE],
    text: TextPolicy::Forbidden,
    validate: validate_oauth,
};

pub static SERVICE: ElementSchema = ElementSchema {
    local_name: "Service",
    attributes: &[A::plain("name")],
    children: &[&REQUEST, &ACCESS, &AUTHORIZATION],
    text: TextPolicy::Forbidden,
    validate: validate_service,
};

const ENDPOINT_ATTRIBUTES: &[A] = &[A::uri("url"), A::plain("method"), A::plain("param_location")];

pub static REQUEST: ElementSchema = ElementSchema {
    local_name: "Request",
    attributes: ENDPOINT_ATTRIBUTES,
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_endpoint,
};

pub static ACCESS: ElementSchema = ElementSchema {
    local_name: "Access",
    attributes: ENDPOINT_ATTRIBUTES,
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_endpoint,
};

pub static AUTHORIZATION: ElementSchema = ElementSchema {
    local_name: "Authorization",
    attributes: &[A::uri("url")],
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_authorization,
};

pub static USER_PREF: ElementSchema = ElementSchema {
    local_name: "UserPref",
    attributes: &[
        A::plain("name"),
        A::text("display_name"),
        A::text("default_value"),
        A::plain("required"),
        A::plain("datatype"),
        A::plain("urlparam"),
        A::uri("autocomplete_url"),
        A::plain("num_minval"),
        A::plain("num_maxval"),
        A::plain("str_maxlen"),
        A::plain("restrict_to_completions"),
        A::plain("prefix_match"),
        A::plain("publish"),
        A::plain("listen"),
        A::plain("on_change"),
        A::plain("group"),
    ],
    children: &[&ENUM_VALUE],
    text: TextPolicy::Forbidden,
    validate: validate_user_pref,
};

pub static ENUM_VALUE: ElementSchema = ElementSchema {
    local_name: "EnumValue",
    attributes: &[A::text("value"), A::text("display_value")],
    children: &[],
    text: TextPolicy::Forbidden,
    validate: validate_enum_value,
};

pub static CONTENT: ElementSchema = ElementSchema {
    local_name: "Content",
    attributes: &[
        A::plain("type"),
        A::uri("href"),
        A::plain("view"),
        A::plain("preferred_height"),
        A::plain("preferred_width"),
        A::plain("authz"),
        A::plain("quirks"),
        A::plain("sign_owner"),
        A::plain("sign_viewer"),
    ],
    children: &[],
    text: TextPolicy::Accumulate { substitute: true },
    validate: validate_content,
};

/// Root of an external message bundle document.
pub static MESSAGE_BUNDLE: ElementSchema = ElementSchema {
    local_name: "messagebundle",
    attributes: &[A::plain("language_direction")],
    children: &[&MSG],
    text: TextPolicy::Forbidden,
    validate: accept_any,
};

fn invalid(message: impl Into<String>) -> ParseError {
    ParseError::Invalid(message.into())
}

fn validate_module(element: &Element) -> Result<(), ParseError> {
    match element.children_of(&MODULE_PREFS).count() {
        0 => return Err(invalid("Module has no ModulePrefs section")),
        1 => {}
        _ => return Err(invalid("Module has more than one ModulePrefs section")),
    }
    if element.first_child(&CONTENT).is_none() {
        return Err(invalid("Module has no Content section"));
    }
    fold_views(element.children_of(&CONTENT)).map(|_| ())
}

fn validate_module_prefs(element: &Element) -> Result<(), ParseError> {
    required(element, "title")?;
    for name in ["title_url", "screenshot", "thumbnail", "author_photo", "author_link"] {
        check_uri(element, name)?;
    }
    if element.children_of(&OAUTH).count() > 1 {
        return Err(invalid("ModulePrefs has more than one OAuth section"));
    }
    Ok(())
}

fn validate_feature(element: &Element) -> Result<(), ParseError> {
    required(element, "feature").map(|_| ())
}

fn validate_param(element: &Element) -> Result<(), ParseError> {
    required(element, "name").map(|_| ())
}

fn validate_preload(element: &Element) -> Result<(), ParseError> {
    required(element, "href")?;
    check_uri(element, "href")?;
    AuthType::from_attr(element)?;
    Ok(())
}

fn validate_link(element: &Element) -> Result<(), ParseError> {
    required(element, "href")?;
    check_uri(element, "href")?;
    LinkRel::from_attr(element)?;
    Ok(())
}

fn validate_locale(element: &Element) -> Result<(), ParseError> {
    if element.attr("messages").is_none() && element.first_child(&MSG).is_none() {
        return Err(invalid(
            "Locale needs a messages attribute or inline msg elements",
        ));
    }
    check_uri(element, "messages")
}

fn validate_msg(element: &Element) -> Result<(), ParseError> {
    required(element, "name").map(|_| ())
}

fn validate_oauth(element: &Element) -> Result<(), ParseError> {
    if element.first_child(&SERVICE).is_none() {
        return Err(invalid("OAuth needs at least one Service"));
    }
    Ok(())
}

fn exactly_one<'a>(
    element: &'a Element,
    schema: &'static ElementSchema,
) -> Result<&'a Element, ParseError> {
    let mut matches = element.children_of(schema);
    match (matches.next(), matches.next()) {
        (Some(child), None) => Ok(child),
        (None, _) => Err(invalid(format!(
            "{} is missing its {} element",
            element.local_name(),
            schema.local_name
        ))),
        (Some(_), Some(_)) => Err(invalid(format!(
            "{} has more than one {} element",
            element.local_name(),
            schema.local_name
        ))),
    }
}

fn validate_service(element: &Element) -> Result<(), ParseError> {
    required(element, "name")?;
    let request = exactly_one(element, &REQUEST)?;
    let access = exactly_one(element, &ACCESS)?;
    exactly_one(element, &AUTHORIZATION)?;
    if Method::from_attr(request)? != Method::from_attr(access)? {
        return Err(invalid(
            "Service Request and Access must use the same method",
        ));
    }
    if ParamLocation::from_attr(request)? != ParamLocation::from_attr(access)? {
        return Err(invalid(
            "Service Request and Access must use the same param_location",
        ));
    }
    Ok(())
}

fn validate_endpoint(element: &Element) -> Result<(), ParseError> {
    required(element, "url")?;
    check_uri(element, "url")?;
    let method = Method::from_attr(element)?;
    let location = ParamLocation::from_attr(element)?;
    if method == Method::Get && location == ParamLocation::Body {
        return Err(invalid(format!(
            "{} cannot send OAuth parameters in the body of a GET request",
            element.local_name()
        )));
    }
    Ok(())
}

fn validate_authorization(element: &Element) -> Result<(), ParseError> {
    required(element, "url")?;
    check_uri(element, "url")
}

fn validate_user_pref(element: &Element) -> Result<(), ParseError> {
    required(element, "name")?;
    DataType::from_attr(element)?;
    Ok(())
}

fn validate_enum_value(element: &Element) -> Result<(), ParseError> {
    required(element, "value").map(|_| ())
}

fn validate_content(element: &Element) -> Result<(), ParseError> {
    let content_type = ContentType::from_attr(element)?;
    AuthType::from_attr(element)?;
    check_uri(element, "href")?;
    if content_type == ContentType::Url && element.attr("href").is_none() {
        return Err(invalid("Content@href is required for type='url'"));
    }
    Ok(())
}
