//! # Playback Engine Adapter
//!
//! Bridge between the queue's source of truth and the engine's shallow
//! mirror.
//!
//! ## Overview
//!
//! The external engine holds exactly one active item. The adapter owns the
//! just-in-time step that makes a queue track playable: reuse a fresh
//! resolution when the track already carries one, otherwise resolve through
//! the shared service (coalescing with any prefetch in flight), then mirror
//! the result into the engine. Whether a finished resolution is still wanted
//! is the coordinator's call — the adapter never touches the queue.

use crate::error::{PlaybackError, Result};
use bridge_traits::{AudioEngine, EngineItem};
use core_resolver::{ResolverService, Track};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Result of preparing a track for the engine.
#[derive(Debug, Clone)]
pub struct PreparedTrack {
    /// The track in resolved form.
    pub track: Track,
    /// Whether resolution produced data the queue does not hold yet. When
    /// set, the caller should write the resolved form back into the queue.
    pub needs_update: bool,
}

/// Mirrors the current queue track into the engine's single active slot.
pub struct EngineAdapter {
    engine: Arc<dyn AudioEngine>,
    service: Arc<ResolverService>,
    locator_ttl: Duration,
}

impl EngineAdapter {
    /// Creates an adapter over the engine and the shared resolver service.
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        service: Arc<ResolverService>,
        locator_ttl: Duration,
    ) -> Self {
        Self {
            engine,
            service,
            locator_ttl,
        }
    }

    /// Makes a queue track playable, resolving just in time when needed.
    ///
    /// A resolved track with a fresh locator passes through untouched. An
    /// unresolved track, or one whose CDN link has outlived its freshness
    /// window, goes through the resolver service; per-identifier coalescing
    /// there means a concurrent prefetch of the same track costs nothing
    /// extra.
    pub async fn prepare(&self, track: &Track) -> Result<PreparedTrack> {
        if let Track::Resolved { locator, .. } = track {
            if !locator.is_stale(self.locator_ttl) {
                return Ok(PreparedTrack {
                    track: track.clone(),
                    needs_update: false,
                });
            }
            debug!(track = %track.id(), "locator expired, re-resolving");
        }

        let source = self.service.resolve(track.id()).await?;
        Ok(PreparedTrack {
            track: Track::Resolved {
                id: track.id().clone(),
                metadata: source.metadata,
                locator: source.locator,
            },
            needs_update: true,
        })
    }

    /// Pushes a resolved track into the engine's active slot.
    ///
    /// `url_override` substitutes a backup URL from the track's fallback
    /// chain while keeping the rest of the item intact.
    pub async fn push(&self, track: &Track, url_override: Option<&str>) -> Result<()> {
        let item = engine_item(track, url_override)?;
        self.engine.load(item).await?;
        Ok(())
    }

    /// Begins or resumes playback.
    pub async fn play(&self) -> Result<()> {
        self.engine.play().await?;
        Ok(())
    }

    /// Pauses playback in place.
    pub async fn pause(&self) -> Result<()> {
        self.engine.pause().await?;
        Ok(())
    }

    /// Stops playback and clears the active slot.
    pub async fn stop(&self) -> Result<()> {
        self.engine.stop().await?;
        Ok(())
    }

    /// Current position within the active item.
    pub async fn position(&self) -> Result<Duration> {
        Ok(self.engine.position().await?)
    }

    /// Seeks within the active track, clamping into its known duration.
    ///
    /// Engines differ in how they handle out-of-range seeks (some error,
    /// some jump to the next item); clamping here keeps the behavior
    /// uniform. Without a known duration the position is passed through.
    pub async fn seek_clamped(&self, position: Duration, duration: Option<Duration>) -> Result<()> {
        let target = match duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.engine.seek(target).await?;
        Ok(())
    }
}

/// Builds the engine's mirror item from a resolved track.
fn engine_item(track: &Track, url_override: Option<&str>) -> Result<EngineItem> {
    match track {
        Track::Unresolved { .. } => Err(PlaybackError::Internal(format!(
            "attempted to push unresolved track {} to the engine",
            track.id()
        ))),
        Track::Resolved {
            id,
            metadata,
            locator,
        } => Ok(EngineItem {
            track_id: id.clone(),
            url: url_override.unwrap_or(&locator.url).to_string(),
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            artwork_url: Some(metadata.cover_url.clone()),
            duration: metadata.duration,
        }),
    }
}
