//! External audio engine abstraction.
//!
//! The platform's media engine plays one stream at a time and keeps only a
//! shallow mirror of the queue. It is strictly a capability interface here:
//! the core pushes one item, drives transport, and listens to transport
//! events. The engine's own queue is never treated as the source of truth.

use crate::api::TrackId;
use crate::error::EngineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// The single item mirrored into the engine's active slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineItem {
    /// Identifier of the queue track this item mirrors.
    pub track_id: TrackId,
    /// Resolved audio URL to stream.
    pub url: String,
    /// Display title for the platform media session.
    pub title: String,
    /// Display artist for the platform media session.
    pub artist: String,
    /// Artwork URL for the platform media session.
    pub artwork_url: Option<String>,
    /// Track duration, when known.
    pub duration: Option<Duration>,
}

/// Transport events emitted by the engine as playback progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TransportEvent {
    /// The active item reached its natural end.
    TrackEnded {
        /// Identifier of the item that finished.
        track_id: TrackId,
    },
    /// The engine entered or left a buffering stall.
    Buffering {
        /// `true` while the engine is stalled waiting for data.
        active: bool,
    },
    /// Streaming the active item's URL failed (e.g., expired CDN link).
    PlaybackFailed {
        /// Identifier of the failing item.
        track_id: TrackId,
        /// The URL that failed.
        url: String,
        /// Engine-reported reason.
        message: String,
    },
    /// Playback position progressed or was moved by a seek.
    PositionChanged {
        /// Elapsed time from the start of the active item.
        position: Duration,
    },
}

/// Async transport surface of the platform's single-stream audio engine.
///
/// All commands may suspend the caller. Implementations must deliver
/// [`TransportEvent`]s for the items they are given; the core relies on
/// `TrackEnded` to auto-advance and on `PlaybackFailed` to walk the
/// backup-URL chain.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Replace the engine's active item. Does not change the play/pause
    /// state unless the engine requires a reload to do so.
    async fn load(&self, item: EngineItem) -> EngineResult<()>;

    /// Begin or resume playback of the active item.
    async fn play(&self) -> EngineResult<()>;

    /// Pause playback, keeping the active item and its position.
    async fn pause(&self) -> EngineResult<()>;

    /// Stop playback and clear the active item.
    async fn stop(&self) -> EngineResult<()>;

    /// Seek within the active item.
    async fn seek(&self, position: Duration) -> EngineResult<()>;

    /// Current playback position of the active item.
    async fn position(&self) -> EngineResult<Duration>;

    /// Subscribe to the engine's transport event stream.
    fn transport_events(&self) -> broadcast::Receiver<TransportEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_item_round_trips_track_identity() {
        let item = EngineItem {
            track_id: TrackId::new("BV1xx411c7mD"),
            url: "https://cdn.example/audio.m4s".to_string(),
            title: "title".to_string(),
            artist: "artist".to_string(),
            artwork_url: None,
            duration: Some(Duration::from_secs(212)),
        };
        assert_eq!(item.track_id, TrackId::new("BV1xx411c7mD"));
        assert_eq!(item.duration, Some(Duration::from_secs(212)));
    }
}
