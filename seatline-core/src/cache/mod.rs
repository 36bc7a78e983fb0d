//! Process-local TTL cache for derived read views.
//!
//! The cache is never authoritative. Every write path that changes an
//! aggregate must invalidate the affected keys itself; nothing here tracks
//! dependencies between keys and the store.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub mod views;

pub use views::EventViewCache;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// String-keyed cache with a per-entry absolute expiry.
///
/// Cloning is cheap and clones share the same entries.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    /// Bumped by every invalidation; a load that straddles one is not stored.
    generation: Arc<AtomicU64>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`. An expired entry is evicted and reported as a miss.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        match self.entries.get(key) {
            None => return None,
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    pub fn set_at(&self, key: impl Into<String>, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Remove the given keys. Returns how many were present.
    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        keys.iter()
            .filter(|key| self.entries.remove(key.as_ref()).is_some())
            .count()
    }

    /// Remove every key containing `pattern`. Returns how many were removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().contains(pattern))
            .map(|entry| entry.key().clone())
            .collect();
        keys.iter()
            .filter(|key| self.entries.remove(key.as_str()).is_some())
            .count()
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Evict everything expired as of `now`. Returns how many were evicted.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_live(now))
            .map(|entry| entry.key().clone())
            .collect();
        expired
            .iter()
            .filter(|key| {
                self.entries
                    .remove_if(key.as_str(), |_, entry| !entry.is_live(now))
                    .is_some()
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-through lookup.
    ///
    /// On a miss the loader runs; a `Some` result is stored for `ttl` unless
    /// the cache was invalidated while the loader was running. Loader errors
    /// and `None` results are returned without touching the cache.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(Some(hit));
        }
        let generation = self.generation.load(Ordering::Acquire);
        let loaded = loader().await?;
        if let Some(value) = &loaded {
            if self.generation.load(Ordering::Acquire) == generation {
                self.set(key, value.clone(), ttl);
            }
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn entries_expire_and_are_evicted_on_read() {
        let cache = TtlCache::new();
        let start = Instant::now();
        cache.set_at("event:a:with_count", 1, TTL, start);

        assert_eq!(cache.get_at("event:a:with_count", start), Some(1));
        assert_eq!(
            cache.get_at("event:a:with_count", start + Duration::from_secs(59)),
            Some(1)
        );
        assert_eq!(cache.get_at("event:a:with_count", start + TTL), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_and_delete_reports_present_keys() {
        let cache = TtlCache::new();
        cache.set("a", 1, TTL);
        cache.set("a", 2, TTL);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.delete(&["a", "missing"]), 1);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn invalidate_pattern_matches_substrings() {
        let cache = TtlCache::new();
        cache.set("events:with_counts", 0, TTL);
        cache.set("event:a:with_count", 0, TTL);
        cache.set("event:b:with_count", 0, TTL);
        cache.set("site:footer", 0, TTL);

        assert_eq!(cache.invalidate_pattern(":a:"), 1);
        assert_eq!(cache.invalidate_pattern("event"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("site:footer"), Some(0));
    }

    #[test]
    fn sweep_only_removes_expired_entries() {
        let cache = TtlCache::new();
        let start = Instant::now();
        cache.set_at("short", 1, Duration::from_secs(1), start);
        cache.set_at("long", 2, Duration::from_secs(100), start);

        assert_eq!(cache.sweep_at(start), 0);
        assert_eq!(cache.sweep_at(start + Duration::from_secs(5)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("long", start + Duration::from_secs(5)), Some(2));
    }

    #[tokio::test]
    async fn get_or_load_populates_on_miss_only() {
        let cache = TtlCache::new();
        let calls = AtomicU64::new(0);
        for _ in 0..3 {
            let loaded: Result<_, ()> = cache
                .get_or_load("k", TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(7))
                })
                .await;
            assert_eq!(loaded, Ok(Some(7)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_or_load_does_not_cache_errors_or_none() {
        let cache: TtlCache<i32> = TtlCache::new();
        let err = cache
            .get_or_load("k", TTL, || async { Err::<Option<i32>, _>("store down") })
            .await;
        assert_eq!(err, Err("store down"));
        let none: Result<_, ()> = cache.get_or_load("k", TTL, || async { Ok(None) }).await;
        assert_eq!(none, Ok(None));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn load_straddling_an_invalidation_is_not_stored() {
        let cache = TtlCache::new();
        let inner = cache.clone();
        let loaded: Result<_, ()> = cache
            .get_or_load("k", TTL, || async move {
                inner.delete(&["k"]);
                Ok(Some(1))
            })
            .await;
        assert_eq!(loaded, Ok(Some(1)));
        assert_eq!(cache.get("k"), None);
    }
}
