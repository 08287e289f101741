//! Fetch → parse → cache pipeline for gadget specifications.

use std::sync::Arc;
use std::time::Duration;

use gadget_core::Specification;
use gadget_xml::ParseError;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{Clock, SoftExpiringCache};
use crate::config::GadgetConfig;
use crate::fetch::{FetchRequest, Fetcher};
use crate::GadgetError;

/// What the specification cache holds for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedOutcome {
    Ready(Arc<Specification>),
    /// Negative entry: the failure is replayed until the entry expires.
    Failed(GadgetError),
}

impl CachedOutcome {
    fn into_result(self) -> Result<Arc<Specification>, GadgetError> {
        match self {
            CachedOutcome::Ready(spec) => Ok(spec),
            CachedOutcome::Failed(err) => Err(err),
        }
    }
}

pub struct SpecPipeline {
    fetcher: Arc<dyn Fetcher>,
    cache: SoftExpiringCache<Url, CachedOutcome>,
    refresh: Duration,
    fetch_ttl: u64,
}

impl SpecPipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &GadgetConfig) -> Self {
        Self {
            fetcher,
            cache: SoftExpiringCache::lru(config.spec_cache_capacity),
            refresh: config.refresh_interval(),
            fetch_ttl: config.fetch_ttl_secs(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = self.cache.with_clock(clock);
        self
    }

    /// Return the specification at `url`, fetching it when the cache has no
    /// fresh entry or `ignore_cache` is set.
    ///
    /// Retrieval and parse failures are cached for the refresh interval and
    /// replayed to later callers. When a refresh fails while an older good
    /// entry exists, that entry stays cached but the new error is still
    /// returned; use [`SpecPipeline::cached`] to opt into the stale value.
    pub async fn resolve(
        &self,
        url: &Url,
        ignore_cache: bool,
    ) -> Result<Arc<Specification>, GadgetError> {
        let previous = if ignore_cache {
            None
        } else {
            self.cache.get(url)
        };

        if let Some(cached) = &previous {
            if !cached.expired {
                debug!(url = %url, "specification cache hit");
                return cached.value.clone().into_result();
            }
            debug!(url = %url, "specification cache entry expired");
        }

        let err = match self.load(url, ignore_cache).await {
            Ok(spec) => {
                let spec = Arc::new(spec);
                self.cache
                    .put(url.clone(), CachedOutcome::Ready(spec.clone()), self.refresh);
                return Ok(spec);
            }
            Err(err) => err,
        };

        if !err.is_cacheable() {
            debug!(url = %url, error = %err, "transient failure, not cached");
            return Err(err);
        }

        let outcome = match previous.map(|cached| cached.value) {
            Some(CachedOutcome::Ready(stale)) => {
                warn!(url = %url, error = %err, "refresh failed, keeping stale specification");
                CachedOutcome::Ready(stale)
            }
            _ => {
                warn!(url = %url, error = %err, "caching failed specification");
                CachedOutcome::Failed(err.clone())
            }
        };
        self.cache.put(url.clone(), outcome, self.refresh);
        Err(err)
    }

    /// Last good specification cached for `url`, expired or not.
    pub fn cached(&self, url: &Url) -> Option<Arc<Specification>> {
        match self.cache.get(url)?.value {
            CachedOutcome::Ready(spec) => Some(spec),
            CachedOutcome::Failed(_) => None,
        }
    }

    /// Drop whatever is cached for `url`.
    pub fn invalidate(&self, url: &Url) {
        self.cache.remove(url);
    }

    async fn load(&self, url: &Url, ignore_cache: bool) -> Result<Specification, GadgetError> {
        let request = FetchRequest::new(url.clone())
            .ignore_cache(ignore_cache)
            .cache_ttl(self.fetch_ttl);
        let response = self.fetcher.fetch(request).await?;
        if !response.is_success() {
            return Err(GadgetError::retrieval(url, response.status));
        }
        let body = response
            .text()
            .map_err(|err| ParseError::Xml(format!("response body is not UTF-8: {err}")))?;
        Ok(Specification::parse(url.clone(), body)?)
    }
}

impl std::fmt::Debug for SpecPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecPipeline")
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

    const GOOD: &str = r#"<Module><ModulePrefs title="good"/><Content>hello</Content></Module>"#;
    const SPEC: &str = "http://example.org/gadget.xml";

    fn pipeline(fetcher: &Arc<FakeFetcher>) -> (SpecPipeline, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = GadgetConfig {
            refresh_interval_ms: 60_000,
            ..GadgetConfig::default()
        };
        let pipeline = SpecPipeline::new(fetcher.clone(), &config).with_clock(clock.clone());
        (pipeline, clock)
    }

    #[tokio::test]
    async fn caches_successful_fetches() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.ok(SPEC, GOOD);
        let (pipeline, _) = pipeline(&fetcher);

        let first = pipeline.resolve(&url(SPEC), false).await.expect("first");
        let second = pipeline.resolve(&url(SPEC), false).await.expect("second");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls(SPEC), 1);

        let request = fetcher.requests.lock()[0].clone();
        assert_eq!(request.cache_ttl, Some(60));
        assert!(!request.ignore_cache);
    }

    #[tokio::test]
    async fn negative_caches_retrieval_errors() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.respond(SPEC, Ok(FetchResponse::with_status(500, "boom")));
        let (pipeline, _) = pipeline(&fetcher);

        let first = pipeline.resolve(&url(SPEC), false).await.unwrap_err();
        let second = pipeline.resolve(&url(SPEC), false).await.unwrap_err();
        assert_eq!(first, GadgetError::retrieval(&url(SPEC), 500));
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(SPEC), 1);
        assert!(pipeline.cached(&url(SPEC)).is_none());
    }

    #[tokio::test]
    async fn negative_entries_expire() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.respond(SPEC, Ok(FetchResponse::ok("<Module>")));
        let (pipeline, clock) = pipeline(&fetcher);

        let err = pipeline.resolve(&url(SPEC), false).await.unwrap_err();
        assert!(matches!(err, GadgetError::Parse(_)));

        fetcher.ok(SPEC, GOOD);
        assert!(pipeline.resolve(&url(SPEC), false).await.is_err());
        assert_eq!(fetcher.calls(SPEC), 1);

        clock.advance(Duration::from_secs(61));
        let spec = pipeline.resolve(&url(SPEC), false).await.expect("recovered");
        assert_eq!(spec.module_prefs().title(), "good");
        assert_eq!(fetcher.calls(SPEC), 2);
    }

    #[tokio::test]
    async fn serves_stale_but_raises_new_error() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.ok(SPEC, GOOD);
        let (pipeline, clock) = pipeline(&fetcher);
        let original = pipeline.resolve(&url(SPEC), false).await.expect("good");
        let snapshot = (*original).clone();

        clock.advance(Duration::from_secs(61));
        fetcher.ok(SPEC, "<Module><ModulePrefs/>");
        let err = pipeline.resolve(&url(SPEC), false).await.unwrap_err();
        assert!(matches!(err, GadgetError::Parse(_)));
        assert_eq!(*original, snapshot);

        let stale = pipeline.cached(&url(SPEC)).expect("stale entry kept");
        assert!(Arc::ptr_eq(&stale, &original));

        // The stale entry was re-put with a fresh TTL and is served again.
        let again = pipeline.resolve(&url(SPEC), false).await.expect("stale hit");
        assert!(Arc::ptr_eq(&again, &original));
        assert_eq!(fetcher.calls(SPEC), 2);
    }

    #[tokio::test]
    async fn transport_errors_are_not_cached() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.respond(SPEC, Err(GadgetError::transport("connection refused")));
        let (pipeline, _) = pipeline(&fetcher);

        for _ in 0..2 {
            let err = pipeline.resolve(&url(SPEC), false).await.unwrap_err();
            assert_eq!(err, GadgetError::transport("connection refused"));
        }
        assert_eq!(fetcher.calls(SPEC), 2);
    }

    #[tokio::test]
    async fn ignore_cache_always_fetches() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.ok(SPEC, GOOD);
        let (pipeline, _) = pipeline(&fetcher);

        pipeline.resolve(&url(SPEC), true).await.expect("first");
        pipeline.resolve(&url(SPEC), true).await.expect("second");
        assert_eq!(fetcher.calls(SPEC), 2);
        assert!(fetcher.requests.lock().iter().all(|r| r.ignore_cache));

        // The fresh result still lands in the cache.
        pipeline.resolve(&url(SPEC), false).await.expect("cached");
        assert_eq!(fetcher.calls(SPEC), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.ok(SPEC, GOOD);
        let (pipeline, _) = pipeline(&fetcher);

        pipeline.resolve(&url(SPEC), false).await.expect("first");
        pipeline.invalidate(&url(SPEC));
        pipeline.resolve(&url(SPEC), false).await.expect("second");
        assert_eq!(fetcher.calls(SPEC), 2);
    }
}
