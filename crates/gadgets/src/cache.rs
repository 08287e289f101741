//! Soft-expiring cache over a pluggable, capacity-bounded store.
//!
//! Entries are never purged when their TTL passes: a read past the TTL still
//! returns the value, flagged as expired, so callers can fall back to stale
//! data. Only the backing store's own capacity policy removes entries.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

/// Key/value storage with its own eviction policy.
///
/// Implementations are shared between threads and synchronize internally.
pub trait CacheStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn put(&self, key: K, value: V);
    fn remove(&self, key: &K) -> Option<V>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Least-recently-used store.
pub struct LruStore<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V> LruStore<K, V> {
    /// Store holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }
}

impl<K, V> CacheStore<K, V> for LruStore<K, V>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().pop(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for LruStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruStore")
            .field("len", &inner.len())
            .field("capacity", &inner.cap())
            .finish()
    }
}

/// A stored value with the time it was written and its TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    inserted: Instant,
    ttl: Duration,
}

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<V> {
    pub value: V,
    /// The entry outlived its TTL; the value is stale but still usable.
    pub expired: bool,
}

pub struct SoftExpiringCache<K, V> {
    store: Box<dyn CacheStore<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> SoftExpiringCache<K, V>
where
    K: Hash + Eq + Send + 'static,
    V: Clone + Send + 'static,
{
    /// LRU-backed cache reading the system clock.
    pub fn lru(capacity: usize) -> Self {
        Self::new(Box::new(LruStore::new(capacity)), Arc::new(SystemClock))
    }
}

impl<K, V: Clone> SoftExpiringCache<K, V> {
    pub fn new(store: Box<dyn CacheStore<K, CacheEntry<V>>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Replace the clock, mainly for deterministic tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn get(&self, key: &K) -> Option<Cached<V>> {
        let entry = self.store.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.inserted);
        let expired = age > entry.ttl;
        trace!(expired, age_ms = age.as_millis() as u64, "cache hit");
        Some(Cached {
            value: entry.value,
            expired,
        })
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted: self.clock.now(),
            ttl,
        };
        self.store.put(key, entry);
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.store.remove(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<K, V> fmt::Debug for SoftExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftExpiringCache")
            .field("len", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> (SoftExpiringCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = SoftExpiringCache::lru(capacity).with_clock(clock.clone());
        (cache, clock)
    }

    #[test]
    fn entries_expire_softly() {
        let (cache, clock) = cache(4);
        cache.put("a".into(), 1, Duration::from_secs(10));
        assert_eq!(
            cache.get(&"a".into()),
            Some(Cached {
                value: 1,
                expired: false
            })
        );

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get(&"a".into()).map(|c| c.expired), Some(false));

        clock.advance(Duration::from_millis(1));
        assert_eq!(
            cache.get(&"a".into()),
            Some(Cached {
                value: 1,
                expired: true
            })
        );
    }

    #[test]
    fn put_refreshes_the_entry() {
        let (cache, clock) = cache(4);
        cache.put("a".into(), 1, Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));
        cache.put("a".into(), 2, Duration::from_secs(1));
        assert_eq!(
            cache.get(&"a".into()),
            Some(Cached {
                value: 2,
                expired: false
            })
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let (cache, _) = cache(2);
        cache.put("a".into(), 1, Duration::from_secs(1));
        cache.put("b".into(), 2, Duration::from_secs(1));
        assert!(cache.get(&"a".into()).is_some());
        cache.put("c".into(), 3, Duration::from_secs(1));
        assert!(cache.get(&"b".into()).is_none());
        assert!(cache.get(&"a".into()).is_some());
        assert!(cache.get(&"c".into()).is_some());
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let store: LruStore<u8, u8> = LruStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.put(1, 1);
        assert_eq!(store.get(&1), Some(1));
        assert_eq!(store.remove(&1), Some(1));
        assert!(store.is_empty());
    }

    #[test]
    fn cache_is_shareable_across_threads() {
        let cache: Arc<SoftExpiringCache<u32, u32>> = Arc::new(SoftExpiringCache::lru(64));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..16 {
                        cache.put(i * 16 + j, j, Duration::from_secs(60));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(cache.len(), 64);
    }
}
