#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level gadget facade: fetches, caches, localizes and renders gadget
//! specifications on top of [`gadget_core`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gadgets::{
//!     FetchRequest, FetchResponse, Fetcher, GadgetConfig, GadgetError, Gadgets, Locale,
//!     RenderRequest,
//! };
//! use url::Url;
//!
//! struct Origin;
//!
//! #[async_trait::async_trait]
//! impl Fetcher for Origin {
//!     async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse, GadgetError> {
//!         Ok(FetchResponse::ok(
//!             r#"<Module><ModulePrefs title="Hi"/><Content>Hello __UP_who__</Content></Module>"#,
//!         ))
//!     }
//! }
//!
//! # async fn run() -> Result<(), GadgetError> {
//! let gadgets = Gadgets::new(Arc::new(Origin), GadgetConfig::default());
//! let url = Url::parse("http://example.org/hello.xml").expect("url");
//! let request = RenderRequest::new(url)
//!     .locale(Locale::new("en", "US"))
//!     .user_pref("who", "world");
//! let rendered = gadgets.render(&request).await?;
//! assert_eq!(rendered.view("default").map(|v| v.content()), Some("Hello world"));
//! # Ok(())
//! # }
//! ```

pub use gadget_core as core;
pub use gadget_xml as xml;

pub mod bundles;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod render;

use std::sync::Arc;

use thiserror::Error;
use url::Url;

pub use bundles::BundleResolver;
pub use cache::{Cached, CacheStore, Clock, LruStore, ManualClock, SoftExpiringCache, SystemClock};
pub use config::GadgetConfig;
pub use fetch::{FetchRequest, FetchResponse, Fetcher};
pub use gadget_core::{Locale, MessageBundle, Specification, View};
pub use gadget_xml::ParseError;
pub use pipeline::{CachedOutcome, SpecPipeline};
pub use render::RenderRequest;

/// Error type produced by the gadget services.
///
/// `Clone` so that a negative-cached failure can be handed out again
/// verbatim on every cache hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GadgetError {
    /// The origin was unreachable or the fetch timed out.
    #[error("transport: {0}")]
    Transport(String),
    /// The origin answered with a non-success status.
    #[error("unable to retrieve {url}: HTTP status {status}")]
    Retrieval { url: String, status: u16 },
    /// The document was malformed or failed validation.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl GadgetError {
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        GadgetError::Transport(msg.into())
    }

    pub fn retrieval(url: &Url, status: u16) -> Self {
        GadgetError::Retrieval {
            url: url.to_string(),
            status,
        }
    }

    /// Whether this failure may be stored as a negative cache entry.
    ///
    /// Transport failures are treated as transient and never cached.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, GadgetError::Transport(_))
    }
}

/// Service facade combining the specification pipeline and the bundle
/// resolver over one [`Fetcher`].
pub struct Gadgets {
    config: GadgetConfig,
    specs: SpecPipeline,
    bundles: BundleResolver,
}

impl Gadgets {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: GadgetConfig) -> Self {
        Self::with_clock(fetcher, config, Arc::new(SystemClock))
    }

    /// Build the facade with both caches reading `clock`.
    pub fn with_clock(fetcher: Arc<dyn Fetcher>, config: GadgetConfig, clock: Arc<dyn Clock>) -> Self {
        let specs = SpecPipeline::new(fetcher.clone(), &config).with_clock(clock.clone());
        let bundles = BundleResolver::new(fetcher, &config).with_clock(clock);
        Self {
            config,
            specs,
            bundles,
        }
    }

    pub fn config(&self) -> &GadgetConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &SpecPipeline {
        &self.specs
    }

    pub fn bundles(&self) -> &BundleResolver {
        &self.bundles
    }

    /// Fetch, parse and cache the specification at `url`.
    pub async fn resolve(
        &self,
        url: &Url,
        ignore_cache: bool,
    ) -> Result<Arc<Specification>, GadgetError> {
        self.specs.resolve(url, ignore_cache).await
    }

    pub fn get_view<'a>(&self, spec: &'a Specification, name: &str) -> Option<&'a View> {
        spec.view(name)
    }

    /// Merged messages for `locale`; never fails.
    pub async fn get_bundle(
        &self,
        spec: &Specification,
        locale: &Locale,
        ignore_cache: bool,
    ) -> Arc<MessageBundle> {
        self.bundles.get_bundle(spec, locale, ignore_cache).await
    }
}

impl std::fmt::Debug for Gadgets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gadgets")
            .field("config", &self.config)
            .field("specs", &self.specs)
            .field("bundles", &self.bundles)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{url, FakeFetcher};
    use super::*;

    #[test]
    fn only_transport_errors_are_transient() {
        assert!(!GadgetError::transport("timeout").is_cacheable());
        assert!(GadgetError::retrieval(&url("http://a/"), 500).is_cacheable());
        assert!(GadgetError::from(ParseError::Invalid("x".into())).is_cacheable());
    }

    #[test]
    fn retrieval_error_names_url_and_status() {
        let err = GadgetError::retrieval(&url("http://example.org/g.xml"), 503);
        assert_eq!(
            err.to_string(),
            "unable to retrieve http://example.org/g.xml: HTTP status 503"
        );
    }

    #[tokio::test]
    async fn facade_resolves_views() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.ok(
            "http://example.org/g.xml",
            r#"<Module><ModulePrefs title="t"/><Content view="a,b">X</Content><Content view="b">Y</Content></Module>"#,
        );
        let gadgets = Gadgets::new(fetcher.clone(), GadgetConfig::default());
        let spec = gadgets
            .resolve(&url("http://example.org/g.xml"), false)
            .await
            .expect("resolve");
        assert_eq!(gadgets.get_view(&spec, "b").map(View::content), Some("XY"));
        assert_eq!(gadgets.get_view(&spec, "a").map(View::content), Some("X"));
        assert!(gadgets.get_view(&spec, "c").is_none());
    }
}
