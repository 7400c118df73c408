//! # Event Bus System
//!
//! Provides an event-driven architecture for the playback core using
//! `tokio::sync::broadcast`. The coordinator and prefetcher publish typed
//! events; the presentation layer subscribes for rendering and never reaches
//! into core state directly.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, PlayerEvent, PlaybackEvent};
//!
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(PlayerEvent::Playback(PlaybackEvent::QueueEnded)).ok();
//! ```
//!
//! ## Error Handling
//!
//! Subscribers that fall behind receive `RecvError::Lagged(n)` and can keep
//! consuming; `RecvError::Closed` signals shutdown.

use bridge_traits::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum PlayerEvent {
    /// Queue mutations and mode changes
    Queue(QueueEvent),
    /// Transport and player state changes
    Playback(PlaybackEvent),
    /// Source resolution outcomes
    Resolve(ResolveEvent),
}

impl PlayerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::Queue(e) => e.description(),
            PlayerEvent::Playback(e) => e.description(),
            PlayerEvent::Resolve(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            PlayerEvent::Resolve(ResolveEvent::Failed { .. }) => EventSeverity::Warning,
            PlayerEvent::Playback(PlaybackEvent::TrackStarted { .. }) => EventSeverity::Info,
            PlayerEvent::Playback(PlaybackEvent::QueueEnded) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events related to queue mutations and traversal modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum QueueEvent {
    /// Tracks were added to the queue.
    TracksEnqueued {
        /// How many tracks were inserted.
        count: usize,
        /// Insertion mode ("append", "replace_all", "insert_next").
        mode: String,
    },
    /// A track was removed from the queue.
    TrackRemoved {
        /// Identifier of the removed track.
        track_id: TrackId,
    },
    /// The queue was cleared.
    Cleared,
    /// The cursor moved to a new position.
    CursorMoved {
        /// New cursor position in traversal order, when the queue is
        /// non-empty.
        index: Option<usize>,
        /// Identifier at the new position.
        track_id: Option<TrackId>,
    },
    /// Shuffle was enabled or disabled.
    ShuffleChanged {
        /// Whether traversal now follows the shuffled view.
        enabled: bool,
    },
    /// Repeat mode cycled.
    RepeatChanged {
        /// New repeat mode ("off", "track", "queue").
        mode: String,
    },
}

impl QueueEvent {
    fn description(&self) -> &str {
        match self {
            QueueEvent::TracksEnqueued { .. } => "Tracks enqueued",
            QueueEvent::TrackRemoved { .. } => "Track removed from queue",
            QueueEvent::Cleared => "Queue cleared",
            QueueEvent::CursorMoved { .. } => "Queue cursor moved",
            QueueEvent::ShuffleChanged { .. } => "Shuffle mode changed",
            QueueEvent::RepeatChanged { .. } => "Repeat mode changed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to transport state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track was handed to the engine and playback started.
    TrackStarted {
        /// The track being played.
        track_id: TrackId,
        /// Display title.
        title: String,
    },
    /// Playback paused.
    Paused {
        /// The active track.
        track_id: TrackId,
    },
    /// Playback resumed after pause.
    Resumed {
        /// The active track.
        track_id: TrackId,
    },
    /// The engine entered or left a buffering stall.
    BufferingChanged {
        /// `true` while buffering.
        active: bool,
    },
    /// Playback position changed (seek or natural progression).
    PositionChanged {
        /// The active track.
        track_id: TrackId,
        /// Elapsed time.
        position: Duration,
    },
    /// The last track ended with repeat off; the session is over.
    QueueEnded,
    /// A user-visible playback failure.
    Error {
        /// The failing track, when known.
        track_id: Option<TrackId>,
        /// Human-readable error message.
        message: String,
        /// Whether the operation can be retried.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::TrackStarted { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::BufferingChanged { .. } => "Buffering state changed",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::QueueEnded => "Queue ended",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Resolve Events
// ============================================================================

/// Events related to source resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ResolveEvent {
    /// A track's audio source was resolved and cached.
    Resolved {
        /// The resolved track.
        track_id: TrackId,
        /// Quality tier selected ("standard", "dolby", "hi_res").
        tier: String,
    },
    /// Resolution failed; prefetch failures stay at this level and are
    /// never surfaced as playback errors.
    Failed {
        /// The failing track.
        track_id: TrackId,
        /// Human-readable failure reason.
        message: String,
    },
}

impl ResolveEvent {
    fn description(&self) -> &str {
        match self {
            ResolveEvent::Resolved { .. } => "Track source resolved",
            ResolveEvent::Failed { .. } => "Track resolution failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to player events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are no active subscribers.
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, SendError<PlayerEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive future events.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_every_subscriber() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let sent = bus
            .emit(PlayerEvent::Playback(PlaybackEvent::QueueEnded))
            .unwrap();
        assert_eq!(sent, 2);

        assert_eq!(
            a.recv().await.unwrap(),
            PlayerEvent::Playback(PlaybackEvent::QueueEnded)
        );
        assert_eq!(
            b.recv().await.unwrap(),
            PlayerEvent::Playback(PlaybackEvent::QueueEnded)
        );
    }

    #[test]
    fn emit_without_subscribers_is_an_error() {
        let bus = EventBus::new(8);
        assert!(bus
            .emit(PlayerEvent::Queue(QueueEvent::Cleared))
            .is_err());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn severity_classification() {
        let err = PlayerEvent::Playback(PlaybackEvent::Error {
            track_id: None,
            message: "boom".into(),
            recoverable: false,
        });
        assert_eq!(err.severity(), EventSeverity::Error);

        let resolve_failed = PlayerEvent::Resolve(ResolveEvent::Failed {
            track_id: TrackId::new("BV1"),
            message: "timeout".into(),
        });
        assert_eq!(resolve_failed.severity(), EventSeverity::Warning);

        let cursor = PlayerEvent::Queue(QueueEvent::CursorMoved {
            index: Some(0),
            track_id: Some(TrackId::new("BV1")),
        });
        assert_eq!(cursor.severity(), EventSeverity::Debug);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlayerEvent::Resolve(ResolveEvent::Resolved {
            track_id: TrackId::new("BV1xx411c7mD"),
            tier: "standard".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Resolve");
        assert_eq!(json["payload"]["event"], "Resolved");
        assert_eq!(json["payload"]["tier"], "standard");
    }
}
