//! # Source Resolution Module
//!
//! Turns bare track identifiers into ready-to-play audio sources.
//!
//! ## Overview
//!
//! A track entering the queue carries only an identifier. Before it can be
//! handed to the audio engine it must pass through resolution:
//!
//! - [`SourceResolver`] - stateless async fetch of metadata plus a playable
//!   audio URL chosen from the platform's tiered dash manifest
//! - [`ResolutionCache`] - bounded LRU memoization of resolved sources, so
//!   reorders and replays do not re-hit the network
//! - [`ResolverService`] - read-through composition of the two with
//!   per-identifier request coalescing
//!
//! The resolver never mutates the queue; callers decide what to do with a
//! resolved source.

pub mod cache;
pub mod error;
pub mod resolver;
pub mod service;
pub mod track;

pub use cache::{ResolutionCache, DEFAULT_CACHE_CAPACITY};
pub use error::{ResolveError, Result};
pub use resolver::{ResolvedSource, SourceResolver};
pub use service::ResolverService;
pub use track::{AudioLocator, QualityTier, Track, TrackMetadata};

// The identifier type is defined next to the API capability it is exchanged
// with; re-export it so downstream crates use one path.
pub use bridge_traits::TrackId;
