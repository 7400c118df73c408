//! Resolution cache.
//!
//! Memoizes resolved sources per track identifier so that queue reorders and
//! replays do not re-hit the network. Entries are immutable once written; a
//! new resolution overwrites. The LRU bound is defensive only — in practice
//! the cache is bounded by queue size.

use crate::resolver::ResolvedSource;
use bridge_traits::TrackId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default maximum number of cached resolutions.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Bounded, thread-safe memoization of resolved sources.
///
/// Shared read/write between the prefetcher and the engine adapter; both
/// only add or overwrite entries keyed by identifier, so concurrent writes
/// are commutative and last-write-wins is safe.
pub struct ResolutionCache {
    inner: Mutex<LruCache<TrackId, ResolvedSource>>,
}

impl ResolutionCache {
    /// Creates a cache bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up a resolved source, marking the entry recently used.
    pub fn get(&self, id: &TrackId) -> Option<ResolvedSource> {
        self.inner.lock().get(id).cloned()
    }

    /// Looks up a resolved source only if its locator is younger than `ttl`.
    pub fn get_fresh(&self, id: &TrackId, ttl: Duration) -> Option<ResolvedSource> {
        self.get(id).filter(|entry| !entry.locator.is_stale(ttl))
    }

    /// Stores (or overwrites) the resolution for an identifier.
    pub fn put(&self, id: TrackId, source: ResolvedSource) {
        self.inner.lock().put(id, source);
    }

    /// Drops the entry for an identifier, forcing the next access to
    /// re-resolve.
    pub fn invalidate(&self, id: &TrackId) {
        self.inner.lock().pop(id);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{AudioLocator, QualityTier, TrackMetadata};
    use chrono::Utc;

    fn source(url: &str) -> ResolvedSource {
        ResolvedSource {
            metadata: TrackMetadata {
                title: "t".into(),
                artist: "a".into(),
                cover_url: "c".into(),
                duration: None,
                multi_page: false,
            },
            locator: AudioLocator {
                url: url.into(),
                backup_urls: vec![],
                tier: QualityTier::Standard,
                resolved_at: Utc::now(),
            },
        }
    }

    #[test]
    fn put_get_invalidate_round_trip() {
        let cache = ResolutionCache::default();
        let id = TrackId::new("BV1");

        assert!(cache.get(&id).is_none());
        cache.put(id.clone(), source("u1"));
        assert_eq!(cache.get(&id).unwrap().locator.url, "u1");

        cache.invalidate(&id);
        assert!(cache.get(&id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn new_resolution_overwrites() {
        let cache = ResolutionCache::default();
        let id = TrackId::new("BV1");
        cache.put(id.clone(), source("old"));
        cache.put(id.clone(), source("new"));
        assert_eq!(cache.get(&id).unwrap().locator.url, "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_bound_evicts_least_recently_used() {
        let cache = ResolutionCache::new(2);
        let a = TrackId::new("BVa");
        let b = TrackId::new("BVb");
        let c = TrackId::new("BVc");

        cache.put(a.clone(), source("a"));
        cache.put(b.clone(), source("b"));
        // Touch `a` so `b` becomes the eviction candidate.
        cache.get(&a);
        cache.put(c.clone(), source("c"));

        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn stale_entries_are_filtered_by_get_fresh() {
        let cache = ResolutionCache::default();
        let id = TrackId::new("BV1");
        let mut stale = source("u");
        stale.locator.resolved_at = Utc::now() - chrono::Duration::hours(3);
        cache.put(id.clone(), stale);

        assert!(cache.get_fresh(&id, Duration::from_secs(3600)).is_none());
        // The raw entry is still present for consumers that tolerate age.
        assert!(cache.get(&id).is_some());
    }
}
