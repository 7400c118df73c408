//! # Player Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`PlayerConfig`] that holds the injected capabilities and tunables the
//! core needs. It enforces fail-fast validation so that a missing capability
//! is reported at construction time with an actionable message, not at the
//! first playback attempt.
//!
//! ## Required Capabilities
//!
//! - [`StreamingApi`] - remote metadata/manifest client
//! - [`AudioEngine`] - the platform's single-stream transport
//!
//! ## Optional Capabilities
//!
//! - [`CredentialsProvider`] - defaults to an anonymous session
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::PlayerConfig;
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .api(Arc::new(MyApiClient::new()))
//!     .engine(Arc::new(MyEngine::new()))
//!     .prefetch_lookahead(3)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AnonymousCredentials, AudioEngine, CredentialsProvider, StreamingApi};
use std::sync::Arc;
use std::time::Duration;

/// Default number of upcoming tracks resolved ahead of the playhead.
pub const DEFAULT_PREFETCH_LOOKAHEAD: usize = 2;

/// Default freshness window for resolved CDN links.
///
/// The platform's audio URLs carry a server-side deadline; one hour keeps a
/// margin below the observed expiry.
pub const DEFAULT_LOCATOR_TTL: Duration = Duration::from_secs(60 * 60);

/// Default buffer size for the player event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Audio quality preferences applied during source resolution.
///
/// Both flags default to off; the resolver then always selects from the
/// standard tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QualityPrefs {
    /// Prefer the hi-res tier when the manifest carries one.
    pub enable_hi_res: bool,
    /// Prefer the Dolby tier when hi-res is unavailable or disabled.
    pub enable_dolby: bool,
}

/// Configuration for the playback core.
///
/// Use [`PlayerConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct PlayerConfig {
    /// Remote metadata/manifest client (required).
    pub api: Arc<dyn StreamingApi>,

    /// External audio engine transport (required).
    pub engine: Arc<dyn AudioEngine>,

    /// Session credentials (defaults to anonymous).
    pub credentials: Arc<dyn CredentialsProvider>,

    /// Quality tier preferences for resolution.
    pub quality: QualityPrefs,

    /// Number of upcoming tracks to resolve ahead of the playhead.
    pub prefetch_lookahead: usize,

    /// Freshness window after which resolved audio URLs are re-resolved.
    pub locator_ttl: Duration,

    /// Buffer size for the event bus channel.
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("api", &"StreamingApi { ... }")
            .field("engine", &"AudioEngine { ... }")
            .field("credentials", &"CredentialsProvider { ... }")
            .field("quality", &self.quality)
            .field("prefetch_lookahead", &self.prefetch_lookahead)
            .field("locator_ttl", &self.locator_ttl)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The lookahead is within a sane bound (resolution calls are
    ///   rate-limited upstream; a huge window would hammer the API)
    /// - The locator TTL and event buffer are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.prefetch_lookahead > 16 {
            return Err(Error::Config(
                "Prefetch lookahead exceeds maximum of 16 tracks".to_string(),
            ));
        }

        if self.locator_ttl.is_zero() {
            return Err(Error::Config(
                "Locator TTL must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`].
#[derive(Default)]
pub struct PlayerConfigBuilder {
    api: Option<Arc<dyn StreamingApi>>,
    engine: Option<Arc<dyn AudioEngine>>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    quality: QualityPrefs,
    prefetch_lookahead: Option<usize>,
    locator_ttl: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl PlayerConfigBuilder {
    /// Injects the remote streaming API client.
    pub fn api(mut self, api: Arc<dyn StreamingApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Injects the external audio engine.
    pub fn engine(mut self, engine: Arc<dyn AudioEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Injects the credentials provider.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets quality tier preferences.
    pub fn quality(mut self, quality: QualityPrefs) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the prefetch lookahead window size.
    pub fn prefetch_lookahead(mut self, lookahead: usize) -> Self {
        self.prefetch_lookahead = Some(lookahead);
        self
    }

    /// Sets the resolved-locator freshness window.
    pub fn locator_ttl(mut self, ttl: Duration) -> Self {
        self.locator_ttl = Some(ttl);
        self
    }

    /// Sets the event bus buffer size.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// Fails fast with [`Error::CapabilityMissing`] when a required
    /// capability has not been injected.
    pub fn build(self) -> Result<PlayerConfig> {
        let api = self.api.ok_or_else(|| Error::CapabilityMissing {
            capability: "StreamingApi".to_string(),
            message: "No streaming API client provided. \
                      Inject the host's metadata/manifest client via \
                      PlayerConfigBuilder::api()."
                .to_string(),
        })?;

        let engine = self.engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioEngine".to_string(),
            message: "No audio engine provided. \
                      Inject the platform's single-stream transport via \
                      PlayerConfigBuilder::engine()."
                .to_string(),
        })?;

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(AnonymousCredentials));

        let config = PlayerConfig {
            api,
            engine,
            credentials,
            quality: self.quality,
            prefetch_lookahead: self.prefetch_lookahead.unwrap_or(DEFAULT_PREFETCH_LOOKAHEAD),
            locator_ttl: self.locator_ttl.unwrap_or(DEFAULT_LOCATOR_TTL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
