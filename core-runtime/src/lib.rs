//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Configuration management with injected capabilities
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the playback crates depend on.
//! It establishes the logging conventions, the capability-injection pattern
//! used instead of ambient global state, and the event broadcasting
//! mechanism the UI layer observes.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{PlayerConfig, PlayerConfigBuilder, QualityPrefs};
pub use error::{Error, Result};
pub use events::EventBus;
