//! Locale fallback resolution of message bundles.
//!
//! A request for `en_US` walks `en_US` → `en_ALL` → `all_ALL`. Each level
//! merges its own messages over the level above it and is cached on its own
//! under `"{spec url}.{locale}"`, so a fresh entry at any level stops the walk.

use std::iter;
use std::sync::Arc;
use std::time::Duration;

use gadget_core::{Locale, MessageBundle, Specification};
use gadget_xml::ParseError;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{Clock, SoftExpiringCache};
use crate::config::GadgetConfig;
use crate::fetch::{FetchRequest, Fetcher};
use crate::GadgetError;

pub struct BundleResolver {
    fetcher: Arc<dyn Fetcher>,
    cache: SoftExpiringCache<String, Arc<MessageBundle>>,
    refresh: Duration,
    fetch_ttl: u64,
}

impl BundleResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &GadgetConfig) -> Self {
        Self {
            fetcher,
            cache: SoftExpiringCache::lru(config.bundle_cache_capacity),
            refresh: config.refresh_interval(),
            fetch_ttl: config.fetch_ttl_secs(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = self.cache.with_clock(clock);
        self
    }

    /// Merged message bundle for `locale`.
    ///
    /// Never fails: a level whose messages cannot be loaded degrades to its
    /// stale cache entry, or else to the bundle of the broader locale.
    pub async fn get_bundle(
        &self,
        spec: &Specification,
        locale: &Locale,
        ignore_cache: bool,
    ) -> Arc<MessageBundle> {
        let chain: Vec<Locale> = iter::successors(Some(locale.clone()), Locale::parent).collect();

        // Walk towards all_ALL until a fresh entry is found, remembering any
        // expired entries seen on the way.
        let mut stale = Vec::with_capacity(chain.len());
        let mut bundle = Arc::new(MessageBundle::empty());
        for level in &chain {
            let cached = if ignore_cache {
                None
            } else {
                self.cache.get(&cache_key(spec, level))
            };
            match cached {
                Some(cached) if !cached.expired => {
                    debug!(url = %spec.url(), locale = %level, "message bundle cache hit");
                    bundle = cached.value;
                    break;
                }
                other => stale.push(other.map(|cached| cached.value)),
            }
        }

        for (level, stale) in chain[..stale.len()].iter().zip(stale).rev() {
            bundle = self
                .refresh_level(spec, level, bundle, stale, ignore_cache)
                .await;
        }
        bundle
    }

    async fn refresh_level(
        &self,
        spec: &Specification,
        locale: &Locale,
        parent: Arc<MessageBundle>,
        stale: Option<Arc<MessageBundle>>,
        ignore_cache: bool,
    ) -> Arc<MessageBundle> {
        let bundle = match self.load_level(spec, locale, &parent, ignore_cache).await {
            Ok(bundle) => bundle,
            Err(err) => match stale {
                Some(stale) => {
                    warn!(url = %spec.url(), locale = %locale, error = %err, "could not refresh message bundle, keeping stale entry");
                    stale
                }
                None => {
                    warn!(url = %spec.url(), locale = %locale, error = %err, "could not load message bundle, using parent locale");
                    parent
                }
            },
        };
        if !ignore_cache {
            self.cache
                .put(cache_key(spec, locale), bundle.clone(), self.refresh);
        }
        bundle
    }

    async fn load_level(
        &self,
        spec: &Specification,
        locale: &Locale,
        parent: &Arc<MessageBundle>,
        ignore_cache: bool,
    ) -> Result<Arc<MessageBundle>, GadgetError> {
        let prefs = spec.module_prefs();
        let Some(locale_spec) = prefs.locale(locale) else {
            return Ok(parent.clone());
        };

        let external = match locale_spec.messages_url(spec.url()) {
            Some(url) => self.fetch_bundle(&url, ignore_cache).await?,
            None => MessageBundle::empty(),
        };
        let level = external.merge(&locale_spec.inline_bundle());
        debug!(url = %spec.url(), locale = %locale, messages = level.len(), "loaded message bundle");
        Ok(Arc::new(parent.merge(&level)))
    }

    async fn fetch_bundle(&self, url: &Url, ignore_cache: bool) -> Result<MessageBundle, GadgetError> {
        let request = FetchRequest::new(url.clone())
            .ignore_cache(ignore_cache)
            .cache_ttl(self.fetch_ttl);
        let response = self.fetcher.fetch(request).await?;
        if !response.is_success() {
            return Err(GadgetError::retrieval(url, response.status));
        }
        let body = response
            .text()
            .map_err(|err| ParseError::Xml(format!("message bundle is not UTF-8: {err}")))?;
        Ok(MessageBundle::parse(body)?)
    }
}

fn cache_key(spec: &Specification, locale: &Locale) -> String {
    format!("{}.{}", spec.url(), locale)
}

impl std::fmt::Debug for BundleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleResolver")
            .field("cache", &self.cache)
            .field("refresh", &self.refresh)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::fetch::FetchResponse;
    use crate::testing::{url, FakeFetcher};
    use gadget_core::Direction;

    const SPEC: &str = "http://example.org/gadgets/spec.xml";
    const FR_BUNDLE: &str = "http://example.org/gadgets/fr.xml";

    const GADGET: &str = r#"<Module>
  <ModulePrefs title="__MSG_title__">
    <Locale>
      <msg name="hello">world</msg>
      <msg name="bye">goodbye</msg>
    </Locale>
    <Locale lang="en" language_direction="rtl">
      <msg name="hello">hi</msg>
    </Locale>
    <Locale lang="fr" messages="fr.xml">
      <msg name="bye">salut</msg>
    </Locale>
  </ModulePrefs>
  <Content/>
</Module>"#;

    fn setup() -> (Arc<FakeFetcher>, BundleResolver, Arc<ManualClock>, Specification) {
        let fetcher = Arc::new(FakeFetcher::new());
        let clock = Arc::new(ManualClock::new());
        let config = GadgetConfig {
            refresh_interval_ms: 10_000,
            ..GadgetConfig::default()
        };
        let resolver = BundleResolver::new(fetcher.clone(), &config).with_clock(clock.clone());
        let spec = Specification::parse(url(SPEC), GADGET).expect("spec");
        (fetcher, resolver, clock, spec)
    }

    #[tokio::test]
    async fn falls_back_through_language_level() {
        let (fetcher, resolver, _, spec) = setup();
        let bundle = resolver
            .get_bundle(&spec, &Locale::new("en", "US"), false)
            .await;
        assert_eq!(bundle.get("hello"), Some("hi"));
        assert_eq!(bundle.get("bye"), Some("goodbye"));
        assert_eq!(bundle.direction(), Direction::Rtl);
        assert_eq!(fetcher.total(), 0);
    }

    #[tokio::test]
    async fn unknown_language_gets_global_messages() {
        let (_, resolver, _, spec) = setup();
        let bundle = resolver
            .get_bundle(&spec, &Locale::new("de", "DE"), false)
            .await;
        assert_eq!(bundle.get("hello"), Some("world"));
        assert_eq!(bundle.direction(), Direction::Ltr);
    }

    #[tokio::test]
    async fn inline_messages_override_external_bundle() {
        let (fetcher, resolver, _, spec) = setup();
        fetcher.ok(
            FR_BUNDLE,
            r#"<messagebundle><msg name="hello">bonjour</msg><msg name="bye">au revoir</msg></messagebundle>"#,
        );
        let bundle = resolver
            .get_bundle(&spec, &Locale::new("fr", "FR"), false)
            .await;
        assert_eq!(bundle.get("hello"), Some("bonjour"));
        assert_eq!(bundle.get("bye"), Some("salut"));

        let request = fetcher.requests.lock()[0].clone();
        assert_eq!(request.cache_ttl, Some(10));
    }

    #[tokio::test]
    async fn levels_are_cached_individually() {
        let (fetcher, resolver, _, spec) = setup();
        fetcher.ok(FR_BUNDLE, r#"<messagebundle><msg name="hello">bonjour</msg></messagebundle>"#);

        let first = resolver
            .get_bundle(&spec, &Locale::new("fr", "FR"), false)
            .await;
        let second = resolver
            .get_bundle(&spec, &Locale::new("fr", "CA"), false)
            .await;
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(FR_BUNDLE), 1);
    }

    #[tokio::test]
    async fn failed_external_bundle_degrades_to_parent() {
        let (fetcher, resolver, _, spec) = setup();
        fetcher.respond(FR_BUNDLE, Ok(FetchResponse::with_status(500, "")));

        let bundle = resolver
            .get_bundle(&spec, &Locale::new("fr", "ALL"), false)
            .await;
        assert_eq!(bundle.get("hello"), Some("world"));
        assert_eq!(bundle.get("bye"), Some("goodbye"));

        resolver
            .get_bundle(&spec, &Locale::new("fr", "ALL"), false)
            .await;
        assert_eq!(fetcher.calls(FR_BUNDLE), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_bundle() {
        let (fetcher, resolver, clock, spec) = setup();
        fetcher.ok(FR_BUNDLE, r#"<messagebundle><msg name="hello">bonjour</msg></messagebundle>"#);
        let fresh = resolver
            .get_bundle(&spec, &Locale::new("fr", "ALL"), false)
            .await;

        clock.advance(Duration::from_secs(11));
        fetcher.ok(FR_BUNDLE, "<messagebundle><msg name='hello'>");
        let stale = resolver
            .get_bundle(&spec, &Locale::new("fr", "ALL"), false)
            .await;
        assert_eq!(stale.get("hello"), Some("bonjour"));
        assert!(Arc::ptr_eq(&fresh, &stale));
        assert_eq!(fetcher.calls(FR_BUNDLE), 2);
    }

    #[tokio::test]
    async fn transport_failure_without_stale_entry_uses_parent() {
        let (fetcher, resolver, _, spec) = setup();
        fetcher.respond(FR_BUNDLE, Err(GadgetError::transport("timed out")));
        let bundle = resolver
            .get_bundle(&spec, &Locale::new("fr", "FR"), true)
            .await;
        assert_eq!(bundle.get("bye"), Some("goodbye"));
        assert!(resolver.cache.is_empty());
    }

    #[tokio::test]
    async fn gadget_without_locales_yields_empty_bundle() {
        let (_, resolver, _, _) = setup();
        let spec = Specification::parse(
            url(SPEC),
            r#"<Module><ModulePrefs title="t"/><Content/></Module>"#,
        )
        .expect("spec");
        let bundle = resolver.get_bundle(&spec, &Locale::all(), false).await;
        assert!(bundle.is_empty());
    }
}
