//! Gadget specification model: vocabulary schemas, typed views over parsed
//! documents, derived views, locales, message bundles and hangman
//! substitution.
//!
//! ```
//! use gadget_core::{Specification, Substitutions, SubstitutionType};
//! use url::Url;
//!
//! let url = Url::parse("http://example.org/hello.xml").unwrap();
//! let spec = Specification::parse(
//!     url.clone(),
//!     r#"<Module><ModulePrefs title="Hi"/><Content>Hello __UP_who__</Content></Module>"#,
//! )
//! .unwrap();
//! let mut subs = Substitutions::with_base(url);
//! subs.add(SubstitutionType::UserPref, "who", "world");
//! let rendered = spec.substitute(&subs);
//! assert_eq!(rendered.view("default").unwrap().content(), "Hello world");
//! ```

pub mod bundle;
pub mod content;
pub mod locale;
pub mod module_prefs;
pub mod oauth;
pub mod schema;
pub mod spec;
pub mod substitute;
pub mod user_pref;
mod values;
pub mod view;

pub use bundle::{Direction, MessageBundle};
pub use content::{AuthType, Content, ContentType, DEFAULT_VIEW};
pub use gadget_xml::{Element, ParseError};
pub use locale::Locale;
pub use module_prefs::{
    Feature, Icon, Link, LinkRel, LocaleMsg, LocaleSpec, ModulePrefs, Preload,
};
pub use oauth::{Method, OAuthAuthorization, OAuthEndpoint, OAuthService, OAuthSpec, ParamLocation};
pub use spec::{Specification, ERROR_PLACEHOLDER};
pub use substitute::{SubstitutionType, Substitutions};
pub use user_pref::{DataType, EnumValue, UserPref};
pub use values::resolve;
pub use view::View;
