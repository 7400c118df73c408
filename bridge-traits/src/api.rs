//! Remote streaming API abstraction.
//!
//! The content platform's HTTP client lives in the host application; the core
//! consumes it through [`StreamingApi`]. The DTO shapes here mirror the
//! platform's dash manifest: audio variants grouped into a standard tier plus
//! optional Dolby and hi-res tiers, each variant carrying a primary URL and
//! an ordered backup-URL chain.

use crate::error::ApiResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Content source a track identifier belongs to.
///
/// Currently a single provider; kept as an enum so identifiers stay
/// self-describing if more sources are added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Bilibili,
}

/// Opaque identifier for one playable unit of audio.
///
/// A multi-part video exposes one `TrackId` per page; `page` is 1-based to
/// match the platform's numbering. Equality is by value, so the same
/// identifier may legitimately appear at multiple queue positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId {
    /// Provider-assigned video identifier (e.g., `BV1xx411c7mD`).
    pub bvid: String,
    /// 1-based page index within the video.
    pub page: u32,
    /// Which provider the identifier belongs to.
    pub source: SourceKind,
}

impl TrackId {
    /// Identifier for the first (or only) page of a video.
    pub fn new(bvid: impl Into<String>) -> Self {
        Self {
            bvid: bvid.into(),
            page: 1,
            source: SourceKind::default(),
        }
    }

    /// Identifier for a specific page of a multi-part video.
    pub fn with_page(bvid: impl Into<String>, page: u32) -> Self {
        Self {
            bvid: bvid.into(),
            page: page.max(1),
            source: SourceKind::default(),
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.page > 1 {
            write!(f, "{}/p{}", self.bvid, self.page)
        } else {
            write!(f, "{}", self.bvid)
        }
    }
}

/// One page (segment) of a multi-part video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page index.
    pub page: u32,
    /// Stream identifier for this page, required when requesting a manifest.
    pub cid: u64,
    /// Page title, when the uploader named the part.
    pub title: Option<String>,
    /// Duration of this page.
    pub duration: Option<Duration>,
}

/// Full metadata for a video as returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Display title.
    pub title: String,
    /// Uploader display name.
    pub artist: String,
    /// Cover image URL.
    pub cover_url: String,
    /// Total duration; some sources omit it.
    pub duration: Option<Duration>,
    /// Page list; a single-part video has exactly one entry.
    pub pages: Vec<PageInfo>,
}

impl TrackInfo {
    /// Look up the page matching a 1-based index.
    pub fn page(&self, index: u32) -> Option<&PageInfo> {
        self.pages.iter().find(|p| p.page == index)
    }

    /// Whether this video is split into multiple parts.
    pub fn is_multi_page(&self) -> bool {
        self.pages.len() > 1
    }
}

/// One audio rendition inside a manifest tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioVariant {
    /// Platform quality code for this rendition.
    pub quality_id: u32,
    /// Primary CDN URL.
    pub primary_url: String,
    /// Ordered fallback URLs to try when the primary fails at play time.
    pub backup_urls: Vec<String>,
}

/// Dash audio manifest grouped by quality tier.
///
/// Tiers may be empty: not every video carries Dolby or hi-res audio, and
/// region-locked or removed content can produce an entirely empty manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioManifest {
    /// Standard lossy renditions, usually several bitrates.
    pub standard: Vec<AudioVariant>,
    /// Dolby renditions, when the video has a Dolby audio track.
    pub dolby: Vec<AudioVariant>,
    /// Hi-res (lossless-ish) renditions, when available.
    pub hi_res: Vec<AudioVariant>,
}

impl AudioManifest {
    /// Returns `true` when no tier contains a playable rendition.
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.dolby.is_empty() && self.hi_res.is_empty()
    }
}

/// Async client for the content platform's metadata and stream endpoints.
///
/// Implementations own transport concerns (cookies, headers, retries at the
/// HTTP layer); the core treats every call as a suspension point and maps
/// failures through [`ApiError`](crate::error::ApiError).
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait StreamingApi: Send + Sync {
    /// Fetch full metadata (title, artist, cover, duration, page list) for a
    /// video.
    async fn fetch_metadata(&self, id: &TrackId) -> ApiResult<TrackInfo>;

    /// Fetch the dash audio manifest for one page of a video.
    async fn fetch_audio_manifest(&self, id: &TrackId, cid: u64) -> ApiResult<AudioManifest>;

    /// List the track identifiers contained in a favorites folder or
    /// collection, in collection order.
    async fn fetch_collection_ids(&self, collection_id: u64) -> ApiResult<Vec<TrackId>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_display_hides_first_page() {
        assert_eq!(TrackId::new("BV1xx411c7mD").to_string(), "BV1xx411c7mD");
        assert_eq!(
            TrackId::with_page("BV1xx411c7mD", 3).to_string(),
            "BV1xx411c7mD/p3"
        );
    }

    #[test]
    fn track_id_page_is_clamped_to_one() {
        assert_eq!(TrackId::with_page("BV1", 0).page, 1);
    }

    #[test]
    fn manifest_emptiness_spans_all_tiers() {
        let mut manifest = AudioManifest::default();
        assert!(manifest.is_empty());

        manifest.dolby.push(AudioVariant {
            quality_id: 30250,
            primary_url: "https://cdn.example/dolby.m4s".to_string(),
            backup_urls: vec![],
        });
        assert!(!manifest.is_empty());
    }

    #[test]
    fn page_lookup_uses_one_based_index() {
        let info = TrackInfo {
            title: "t".into(),
            artist: "a".into(),
            cover_url: "c".into(),
            duration: None,
            pages: vec![
                PageInfo {
                    page: 1,
                    cid: 100,
                    title: None,
                    duration: None,
                },
                PageInfo {
                    page: 2,
                    cid: 200,
                    title: Some("part 2".into()),
                    duration: Some(Duration::from_secs(30)),
                },
            ],
        };
        assert_eq!(info.page(2).map(|p| p.cid), Some(200));
        assert!(info.is_multi_page());
    }
}
