//! Track model.
//!
//! A queue entry is either a bare identifier or a fully resolved track. The
//! split is a tagged variant rather than an always-optional bag of fields:
//! code that holds a [`Track::Resolved`] has compiler-checked access to
//! metadata and locator, and an unresolved track cannot be pushed to the
//! engine by construction.

use bridge_traits::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio quality tier a source was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Standard lossy rendition.
    Standard,
    /// Dolby audio track.
    Dolby,
    /// Hi-res (lossless-ish) rendition.
    HiRes,
}

impl QualityTier {
    /// Stable lowercase name used in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Standard => "standard",
            QualityTier::Dolby => "dolby",
            QualityTier::HiRes => "hi_res",
        }
    }
}

/// A resolved, playable audio location.
///
/// CDN links are short-lived; `resolved_at` lets consumers decide when a
/// locator is too old to trust and must be re-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioLocator {
    /// Primary CDN URL.
    pub url: String,
    /// Ordered fallback URLs recorded at resolve time, to be attempted only
    /// when playback of the primary fails at runtime.
    pub backup_urls: Vec<String>,
    /// Tier the variant was selected from.
    pub tier: QualityTier,
    /// When this locator was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl AudioLocator {
    /// Returns `true` once the locator is older than the given freshness
    /// window.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.resolved_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age > ttl,
            // A TTL too large for chrono means the locator never expires.
            Err(_) => false,
        }
    }

    /// The full fallback chain: primary URL first, then backups in order.
    pub fn url_chain(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str()).chain(self.backup_urls.iter().map(String::as_str))
    }
}

/// Display metadata for a resolved track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Display title; for a named page of a multi-part video this is the
    /// page title.
    pub title: String,
    /// Uploader display name.
    pub artist: String,
    /// Cover image URL.
    pub cover_url: String,
    /// Duration of this track (page-specific for multi-part videos); some
    /// sources omit it.
    pub duration: Option<Duration>,
    /// Whether the track is one part of a multi-segment video.
    pub multi_page: bool,
}

/// A queue entry: a bare identifier, or an identifier plus everything needed
/// to play it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Track {
    /// Only the identifier is known; the track must pass through the
    /// resolver before it can play.
    Unresolved {
        /// Provider identifier.
        id: TrackId,
    },
    /// Metadata and a playable locator are available.
    Resolved {
        /// Provider identifier.
        id: TrackId,
        /// Display metadata.
        metadata: TrackMetadata,
        /// Playable audio location.
        locator: AudioLocator,
    },
}

impl Track {
    /// A fresh, unresolved entry for the given identifier.
    pub fn unresolved(id: TrackId) -> Self {
        Track::Unresolved { id }
    }

    /// The track's identifier, resolved or not.
    pub fn id(&self) -> &TrackId {
        match self {
            Track::Unresolved { id } => id,
            Track::Resolved { id, .. } => id,
        }
    }

    /// Returns `true` when metadata and locator are present.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Track::Resolved { .. })
    }

    /// Display metadata, when resolved.
    pub fn metadata(&self) -> Option<&TrackMetadata> {
        match self {
            Track::Unresolved { .. } => None,
            Track::Resolved { metadata, .. } => Some(metadata),
        }
    }

    /// Audio locator, when resolved.
    pub fn locator(&self) -> Option<&AudioLocator> {
        match self {
            Track::Unresolved { .. } => None,
            Track::Resolved { locator, .. } => Some(locator),
        }
    }

    /// Title for display, falling back to the identifier.
    pub fn display_title(&self) -> String {
        match self {
            Track::Unresolved { id } => id.to_string(),
            Track::Resolved { metadata, .. } => metadata.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(resolved_at: DateTime<Utc>) -> AudioLocator {
        AudioLocator {
            url: "https://cdn.example/a.m4s".into(),
            backup_urls: vec!["https://cdn2.example/a.m4s".into()],
            tier: QualityTier::Standard,
            resolved_at,
        }
    }

    #[test]
    fn fresh_locator_is_not_stale() {
        let loc = locator(Utc::now());
        assert!(!loc.is_stale(Duration::from_secs(3600)));
    }

    #[test]
    fn old_locator_goes_stale() {
        let loc = locator(Utc::now() - chrono::Duration::hours(2));
        assert!(loc.is_stale(Duration::from_secs(3600)));
    }

    #[test]
    fn url_chain_starts_with_primary() {
        let loc = locator(Utc::now());
        let chain: Vec<&str> = loc.url_chain().collect();
        assert_eq!(
            chain,
            vec!["https://cdn.example/a.m4s", "https://cdn2.example/a.m4s"]
        );
    }

    #[test]
    fn unresolved_track_has_no_playable_state() {
        let track = Track::unresolved(TrackId::new("BV1xx411c7mD"));
        assert!(!track.is_resolved());
        assert!(track.metadata().is_none());
        assert!(track.locator().is_none());
        assert_eq!(track.display_title(), "BV1xx411c7mD");
    }
}
