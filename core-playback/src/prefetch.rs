//! Lookahead prefetching.
//!
//! Resolves the next few tracks in traversal order ahead of the playhead so
//! that a skip or natural track end starts instantly from cache. Prefetching
//! is strictly best-effort: failures are logged and announced on the event
//! bus at resolve level, never escalated to playback errors — the track gets
//! a second chance when it actually becomes current.

use bridge_traits::TrackId;
use core_resolver::ResolverService;
use core_runtime::events::{EventBus, PlayerEvent, ResolveEvent};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Upper bound on simultaneous prefetch resolutions. The upstream API is
/// rate-limited; the per-identifier coalescing in the resolver service
/// already deduplicates, this bounds distinct identifiers in flight.
const MAX_CONCURRENT_PREFETCH: usize = 2;

/// Background resolver for upcoming tracks.
#[derive(Clone)]
pub struct Prefetcher {
    service: Arc<ResolverService>,
    events: EventBus,
}

impl Prefetcher {
    /// Creates a prefetcher over a shared resolver service.
    pub fn new(service: Arc<ResolverService>, events: EventBus) -> Self {
        Self { service, events }
    }

    /// Resolves the given window of identifiers in the background.
    ///
    /// Identifiers with a fresh cached resolution are skipped. The returned
    /// handle is for tests and shutdown; callers normally fire and forget.
    /// A window scheduled just before the cursor moves is harmless: whatever
    /// completes lands in the cache and is never pushed to the engine.
    pub fn schedule(&self, window: Vec<TrackId>) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let misses: Vec<_> = window
            .into_iter()
            .filter(|id| !service.is_cached(id))
            .collect();

        tokio::spawn(async move {
            if misses.is_empty() {
                return;
            }
            debug!(count = misses.len(), "prefetching upcoming tracks");
            stream::iter(misses)
                .for_each_concurrent(MAX_CONCURRENT_PREFETCH, |id| {
                    let service = Arc::clone(&service);
                    let events = events.clone();
                    async move {
                        match service.resolve(&id).await {
                            Ok(source) => {
                                events
                                    .emit(PlayerEvent::Resolve(ResolveEvent::Resolved {
                                        track_id: id,
                                        tier: source.locator.tier.as_str().to_string(),
                                    }))
                                    .ok();
                            }
                            Err(err) => {
                                warn!(track = %id, error = %err, "prefetch resolution failed");
                                events
                                    .emit(PlayerEvent::Resolve(ResolveEvent::Failed {
                                        track_id: id,
                                        message: err.to_string(),
                                    }))
                                    .ok();
                            }
                        }
                    }
                })
                .await;
        })
    }
}
