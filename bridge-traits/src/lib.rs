//! # Host Bridge Traits
//!
//! Capability traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! collaborators it does not own. Each trait represents a capability the core
//! requires but that lives outside it:
//!
//! - [`StreamingApi`](api::StreamingApi) - Remote metadata/stream-manifest
//!   client for the content platform
//! - [`CredentialsProvider`](credentials::CredentialsProvider) - Session
//!   cookie access, injected instead of read from ambient global state
//! - [`AudioEngine`](engine::AudioEngine) - The external single-stream audio
//!   transport (play/pause/seek primitives plus transport events)
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing; see `core-runtime`'s configuration builder.
//!
//! ## Error Handling
//!
//! API capabilities report [`ApiError`](error::ApiError) and the engine
//! reports [`EngineError`](error::EngineError). Host implementations should
//! convert platform-specific failures into these taxonomies and keep the
//! messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod api;
pub mod credentials;
pub mod engine;
pub mod error;

pub use error::{ApiError, ApiResult, EngineError, EngineResult};

// Re-export commonly used types
pub use api::{AudioManifest, AudioVariant, PageInfo, SourceKind, StreamingApi, TrackId, TrackInfo};
pub use credentials::{AnonymousCredentials, CredentialsProvider};
pub use engine::{AudioEngine, EngineItem, TransportEvent};

#[cfg(feature = "mock")]
pub use api::MockStreamingApi;
#[cfg(feature = "mock")]
pub use credentials::MockCredentialsProvider;
#[cfg(feature = "mock")]
pub use engine::MockAudioEngine;
