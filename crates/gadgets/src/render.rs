//! Request-scoped rendering: resolve, localize, substitute.

use std::collections::BTreeMap;

use gadget_core::{Locale, Specification, SubstitutionType, Substitutions};
use tracing::debug;
use url::Url;

use crate::{GadgetError, Gadgets};

/// One render of one gadget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: Url,
    pub locale: Locale,
    /// Values for declared user preferences; missing ones use their defaults.
    pub user_prefs: BTreeMap<String, String>,
    /// Substituted for `__MODULE_ID__`.
    pub module_id: u64,
    pub ignore_cache: bool,
}

impl RenderRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            locale: Locale::all(),
            user_prefs: BTreeMap::new(),
            module_id: 0,
            ignore_cache: false,
        }
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn user_pref(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_prefs.insert(name.into(), value.into());
        self
    }

    pub fn module_id(mut self, id: u64) -> Self {
        self.module_id = id;
        self
    }

    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore_cache = ignore;
        self
    }
}

impl Gadgets {
    /// Resolve the gadget, load its messages for the request locale and
    /// return a private copy with every placeholder filled in.
    pub async fn render(&self, request: &RenderRequest) -> Result<Specification, GadgetError> {
        let spec = self.resolve(&request.url, request.ignore_cache).await?;
        let bundle = self
            .get_bundle(&spec, &request.locale, request.ignore_cache)
            .await;

        let mut substitutions = Substitutions::with_base(spec.url().clone());
        substitutions
            .add_messages(&bundle)
            .add_bidi(bundle.direction())
            .add(SubstitutionType::Module, "ID", request.module_id.to_string());
        for pref in spec.user_prefs() {
            let value = request
                .user_prefs
                .get(pref.name())
                .map(String::as_str)
                .unwrap_or_else(|| pref.default_value());
            substitutions.add(SubstitutionType::UserPref, pref.name(), value);
        }

        debug!(
            url = %request.url,
            locale = %request.locale,
            messages = bundle.len(),
            "rendering gadget"
        );
        Ok(spec.substitute(&substitutions))
    }
}
