//! Resolution error taxonomy.

use bridge_traits::ApiError;
use thiserror::Error;

/// Errors that can occur while resolving a track's audio source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The provider requires a session and none is available.
    #[error("Not authenticated: {0}")]
    NoCredentials(String),

    /// The identifier is invalid or the content was removed.
    #[error("Track not found: {0}")]
    NotFound(String),

    /// Every tier of the audio manifest was empty.
    #[error("No playable audio source for {0}")]
    NoPlayableSource(String),

    /// Transient network failure; retryable with backoff.
    #[error("Network failure: {0}")]
    Network(String),

    /// The platform rejected the request due to rate limiting; retryable.
    #[error("Rate limited by remote API")]
    RateLimited,

    /// The API answered but the response could not be interpreted.
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

impl ResolveError {
    /// Returns `true` if the resolution may succeed when retried with
    /// backoff. All other kinds are terminal for the attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Network(_) | ResolveError::RateLimited)
    }
}

impl From<ApiError> for ResolveError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NoCredentials(msg) => ResolveError::NoCredentials(msg),
            ApiError::NotFound(msg) => ResolveError::NotFound(msg),
            ApiError::RateLimited => ResolveError::RateLimited,
            ApiError::Network(msg) => ResolveError::Network(msg),
            ApiError::Malformed(msg) => ResolveError::Malformed(msg),
        }
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ResolveError::Network("timeout".into()).is_transient());
        assert!(ResolveError::RateLimited.is_transient());
        assert!(!ResolveError::NotFound("BV1".into()).is_transient());
        assert!(!ResolveError::NoPlayableSource("BV1".into()).is_transient());
    }

    #[test]
    fn api_errors_map_onto_taxonomy() {
        assert_eq!(
            ResolveError::from(ApiError::RateLimited),
            ResolveError::RateLimited
        );
        assert_eq!(
            ResolveError::from(ApiError::NotFound("gone".into())),
            ResolveError::NotFound("gone".into())
        );
    }
}
