//! Playback error types.

use bridge_traits::EngineError;
use core_resolver::ResolveError;
use thiserror::Error;

/// Errors surfaced by the playback coordinator.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Resolving a track's audio source failed.
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// The audio engine rejected a command.
    #[error("Engine failure: {0}")]
    Engine(#[from] EngineError),

    /// A transport command was issued with no active track.
    #[error("No track is loaded")]
    NoTrackLoaded,

    /// Internal invariant violation.
    #[error("Internal playback error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::Resolve(e) => e.is_transient(),
            PlaybackError::Engine(_) => true,
            PlaybackError::NoTrackLoaded | PlaybackError::Internal(_) => false,
        }
    }
}

/// Result alias for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
