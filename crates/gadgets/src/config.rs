//! Service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables shared by the specification and bundle caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GadgetConfig {
    /// Freshness window of cached specifications and bundles, in milliseconds.
    pub refresh_interval_ms: u64,
    pub spec_cache_capacity: usize,
    pub bundle_cache_capacity: usize,
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 300_000,
            spec_cache_capacity: 1024,
            bundle_cache_capacity: 4096,
        }
    }
}

impl GadgetConfig {
    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Cache lifetime forwarded to the fetcher, in whole seconds.
    pub fn fetch_ttl_secs(&self) -> u64 {
        self.refresh_interval_ms / 1000
    }
}
