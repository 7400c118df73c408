use thiserror::Error;

/// Errors reported by the remote streaming API capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No session cookie is available and the endpoint requires one.
    #[error("Not authenticated: {0}")]
    NoCredentials(String),

    /// The identifier is invalid or the content has been removed.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The platform rejected the request due to rate limiting.
    #[error("Rate limited by remote API")]
    RateLimited,

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("Network failure: {0}")]
    Network(String),

    /// The response arrived but could not be interpreted.
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Returns `true` if the operation may succeed when retried with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::RateLimited)
    }
}

/// Errors reported by the external audio engine capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected the item pushed to its queue.
    #[error("Engine rejected load: {0}")]
    LoadRejected(String),

    /// A transport command (play/pause/seek/stop) failed.
    #[error("Engine transport failure: {0}")]
    TransportFailed(String),

    /// The engine has no active item for the requested operation.
    #[error("No item loaded in engine")]
    NothingLoaded,
}

/// Result alias for streaming API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result alias for engine transport operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
