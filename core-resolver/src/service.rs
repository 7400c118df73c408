//! Read-through resolution with request coalescing.
//!
//! Both the prefetcher and the engine adapter resolve tracks; without
//! coordination a cursor move could issue the same upstream request twice.
//! `ResolverService` serializes resolution per identifier with a keyed async
//! lock: concurrent callers for one id perform exactly one network call, the
//! rest observe the fresh cache entry written by the winner.

use crate::cache::ResolutionCache;
use crate::error::Result;
use crate::resolver::{ResolvedSource, SourceResolver};
use bridge_traits::TrackId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, trace};

/// Read-through resolver: cache check, per-id coalescing, write-through.
pub struct ResolverService {
    resolver: SourceResolver,
    cache: ResolutionCache,
    locator_ttl: Duration,
    inflight: AsyncMutex<HashMap<TrackId, Arc<AsyncMutex<()>>>>,
}

impl ResolverService {
    /// Creates a service over a resolver and a cache.
    pub fn new(resolver: SourceResolver, cache: ResolutionCache, locator_ttl: Duration) -> Self {
        Self {
            resolver,
            cache,
            locator_ttl,
            inflight: AsyncMutex::new(HashMap::new()),
        }
    }

    /// Resolves an identifier, serving fresh cache hits without touching the
    /// network and coalescing concurrent misses for the same identifier.
    ///
    /// A resolution that completes after its caller has lost interest is
    /// still written through to the cache — the result stays usable for a
    /// later replay.
    pub async fn resolve(&self, id: &TrackId) -> Result<ResolvedSource> {
        if let Some(hit) = self.cache.get_fresh(id, self.locator_ttl) {
            trace!(track = %id, "resolution cache hit");
            return Ok(hit);
        }

        let slot = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        // Only one caller per identifier proceeds past this point at a time;
        // the rest queue up and then observe the winner's cache write below.
        let _guard = slot.lock().await;

        if let Some(hit) = self.cache.get_fresh(id, self.locator_ttl) {
            trace!(track = %id, "resolution coalesced onto completed request");
            return Ok(hit);
        }

        debug!(track = %id, "resolving audio source");
        let outcome = self.resolver.resolve(id).await;

        if let Ok(ref source) = outcome {
            self.cache.put(id.clone(), source.clone());
        }

        {
            let mut inflight = self.inflight.lock().await;
            inflight.remove(id);
        }

        outcome
    }

    /// Drops any cached resolution for an identifier.
    pub fn invalidate(&self, id: &TrackId) {
        self.cache.invalidate(id);
    }

    /// Peeks the cache without resolving.
    pub fn cached(&self, id: &TrackId) -> Option<ResolvedSource> {
        self.cache.get_fresh(id, self.locator_ttl)
    }

    /// Whether an identifier already has a fresh cached resolution.
    pub fn is_cached(&self, id: &TrackId) -> bool {
        self.cached(id).is_some()
    }
}
