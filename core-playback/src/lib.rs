//! # Playback Module
//!
//! Queue management and playback coordination over an external audio engine.
//!
//! ## Overview
//!
//! The playback core owns the queue as its single source of truth and drives
//! the platform's one-item engine from it:
//!
//! - [`QueueModel`] - canonical track list, shuffle permutation, cursor and
//!   repeat mode; pure synchronous state
//! - [`Prefetcher`] - best-effort background resolution of upcoming tracks
//! - [`EngineAdapter`] - just-in-time resolution and the engine mirror
//! - [`PlaybackCoordinator`] - the public command surface and the transport
//!   event pump tying it all together
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{EnqueueRequest, PlaybackCoordinator};
//! use core_runtime::config::PlayerConfig;
//!
//! let config = PlayerConfig::builder()
//!     .api(api)
//!     .engine(engine)
//!     .build()?;
//! let player = PlaybackCoordinator::new(config);
//! player.spawn_event_pump();
//! player.enqueue(EnqueueRequest::replace_and_play(tracks)).await?;
//! ```

pub mod adapter;
pub mod coordinator;
pub mod error;
pub mod prefetch;
pub mod queue;

pub use adapter::{EngineAdapter, PreparedTrack};
pub use coordinator::{EnqueueRequest, PlaybackCoordinator, PlayerSnapshot, PlayerState};
pub use error::{PlaybackError, Result};
pub use prefetch::Prefetcher;
pub use queue::{
    Advance, Direction, EnqueueMode, QueueModel, RemoveOutcome, RepeatMode,
};

pub use core_resolver::{Track, TrackId};
