//! Stateless source resolution.
//!
//! Fetches full metadata and the dash audio manifest for one track, then
//! selects a playable variant according to the configured quality policy.
//! Holds no state beyond its injected capabilities; persistence of results
//! is the caller's decision (see [`crate::service::ResolverService`]).

use crate::error::{ResolveError, Result};
use crate::track::{AudioLocator, QualityTier, TrackMetadata};
use bridge_traits::{AudioManifest, AudioVariant, CredentialsProvider, StreamingApi, TrackId};
use chrono::Utc;
use core_runtime::config::QualityPrefs;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Output of a successful resolution: everything the queue needs to make a
/// track playable. Also the unit stored in the resolution cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Display metadata.
    pub metadata: TrackMetadata,
    /// Playable audio location with its fallback chain.
    pub locator: AudioLocator,
}

/// Stateless async resolver: a pure function of (identifier, capabilities,
/// preferences).
pub struct SourceResolver {
    api: Arc<dyn StreamingApi>,
    credentials: Arc<dyn CredentialsProvider>,
    quality: QualityPrefs,
}

impl SourceResolver {
    /// Creates a resolver over the injected API client and credentials.
    pub fn new(
        api: Arc<dyn StreamingApi>,
        credentials: Arc<dyn CredentialsProvider>,
        quality: QualityPrefs,
    ) -> Self {
        Self {
            api,
            credentials,
            quality,
        }
    }

    /// Resolves one track identifier into metadata plus a playable locator.
    ///
    /// Selection policy: hi-res if present and enabled, else Dolby if
    /// present and enabled, else standard; an empty chosen tier falls
    /// through, and [`ResolveError::NoPlayableSource`] is returned only when
    /// every tier is empty. Backup URLs are recorded on the locator, not
    /// probed here.
    #[instrument(skip(self), fields(track = %id))]
    pub async fn resolve(&self, id: &TrackId) -> Result<ResolvedSource> {
        if !self.credentials.is_authenticated() {
            // Anonymous sessions can still play public content; the API
            // reports NoCredentials for endpoints that do require login.
            debug!("resolving without an authenticated session");
        }

        let info = self.api.fetch_metadata(id).await?;
        let page = info.page(id.page).cloned().ok_or_else(|| {
            ResolveError::NotFound(format!("{} has no page {}", id.bvid, id.page))
        })?;

        let manifest = self.api.fetch_audio_manifest(id, page.cid).await?;
        let (variant, tier) = select_variant(&manifest, self.quality)
            .ok_or_else(|| ResolveError::NoPlayableSource(id.to_string()))?;

        debug!(tier = tier.as_str(), quality_id = variant.quality_id, "selected audio variant");

        let multi_page = info.is_multi_page();
        let title = match (&page.title, multi_page) {
            (Some(page_title), true) => format!("{} - {}", info.title, page_title),
            _ => info.title.clone(),
        };

        Ok(ResolvedSource {
            metadata: TrackMetadata {
                title,
                artist: info.artist,
                cover_url: info.cover_url,
                duration: page.duration.or(info.duration),
                multi_page,
            },
            locator: AudioLocator {
                url: variant.primary_url.clone(),
                backup_urls: variant.backup_urls.clone(),
                tier,
                resolved_at: Utc::now(),
            },
        })
    }
}

/// Applies the tier preference policy to a manifest.
///
/// Preferred tiers that are disabled or empty fall through toward standard;
/// when even standard is empty, any remaining non-empty tier is taken rather
/// than failing while playable audio exists.
fn select_variant(manifest: &AudioManifest, quality: QualityPrefs) -> Option<(&AudioVariant, QualityTier)> {
    let mut order: Vec<QualityTier> = Vec::with_capacity(3);
    if quality.enable_hi_res {
        order.push(QualityTier::HiRes);
    }
    if quality.enable_dolby {
        order.push(QualityTier::Dolby);
    }
    order.push(QualityTier::Standard);
    for tier in [QualityTier::Dolby, QualityTier::HiRes] {
        if !order.contains(&tier) {
            order.push(tier);
        }
    }

    for tier in order {
        let variants = match tier {
            QualityTier::Standard => &manifest.standard,
            QualityTier::Dolby => &manifest.dolby,
            QualityTier::HiRes => &manifest.hi_res,
        };
        if let Some(best) = variants.iter().max_by_key(|v| v.quality_id) {
            return Some((best, tier));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(quality_id: u32, url: &str) -> AudioVariant {
        AudioVariant {
            quality_id,
            primary_url: url.to_string(),
            backup_urls: vec![],
        }
    }

    fn manifest(standard: Vec<AudioVariant>, dolby: Vec<AudioVariant>, hi_res: Vec<AudioVariant>) -> AudioManifest {
        AudioManifest {
            standard,
            dolby,
            hi_res,
        }
    }

    #[test]
    fn standard_only_prefs_pick_best_standard() {
        let m = manifest(
            vec![variant(30216, "low"), variant(30280, "high")],
            vec![variant(30250, "dolby")],
            vec![],
        );
        let (v, tier) = select_variant(&m, QualityPrefs::default()).unwrap();
        assert_eq!(tier, QualityTier::Standard);
        assert_eq!(v.primary_url, "high");
    }

    #[test]
    fn hi_res_preferred_when_enabled() {
        let m = manifest(
            vec![variant(30280, "std")],
            vec![],
            vec![variant(30251, "hires")],
        );
        let prefs = QualityPrefs {
            enable_hi_res: true,
            enable_dolby: false,
        };
        let (v, tier) = select_variant(&m, prefs).unwrap();
        assert_eq!(tier, QualityTier::HiRes);
        assert_eq!(v.primary_url, "hires");
    }

    #[test]
    fn empty_preferred_tier_falls_through() {
        let m = manifest(vec![variant(30280, "std")], vec![], vec![]);
        let prefs = QualityPrefs {
            enable_hi_res: true,
            enable_dolby: true,
        };
        let (v, tier) = select_variant(&m, prefs).unwrap();
        assert_eq!(tier, QualityTier::Standard);
        assert_eq!(v.primary_url, "std");
    }

    #[test]
    fn non_preferred_tier_is_last_resort_over_failure() {
        let m = manifest(vec![], vec![variant(30250, "dolby")], vec![]);
        let (v, tier) = select_variant(&m, QualityPrefs::default()).unwrap();
        assert_eq!(tier, QualityTier::Dolby);
        assert_eq!(v.primary_url, "dolby");
    }

    #[test]
    fn fully_empty_manifest_yields_none() {
        let m = manifest(vec![], vec![], vec![]);
        assert!(select_variant(&m, QualityPrefs::default()).is_none());
    }
}
