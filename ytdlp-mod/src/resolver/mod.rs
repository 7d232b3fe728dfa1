//! Quality tier resolution.
//!
//! [`resolve`] turns the flat `formats` list of an [`ExtractedInfo`] into a
//! [`QualityResolvedMap`]: one stream per video tier for the requested
//! container plus one stream per audio tier for the matching audio
//! container. [`QualityResolvedMap::with_audio_video_size`] then annotates
//! the map with muxed size estimates.

mod size;

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{
    AudioQuality, ExtractedInfo, MediaExtension, QualityTier, StreamCandidate, VideoQuality
};

pub use size::attach_audio_video_size;

#[derive(Debug, Clone, PartialEq)]
pub struct QualityResolvedMap {
    container: MediaExtension,
    entries: BTreeMap<QualityTier, StreamCandidate>
}

impl QualityResolvedMap {
    pub fn empty(container: MediaExtension) -> Self {
        Self {
            container,
            entries: BTreeMap::new()
        }
    }

    /// Container the video tiers were resolved for.
    pub fn container(&self) -> MediaExtension {
        self.container
    }

    pub fn get(&self, tier: impl Into<QualityTier>) -> Option<&StreamCandidate> {
        self.entries.get(&tier.into())
    }

    pub fn contains(&self, tier: impl Into<QualityTier>) -> bool {
        self.entries.contains_key(&tier.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Present tiers, video tiers first, each group lowest first.
    pub fn tiers(&self) -> Vec<QualityTier> {
        self.entries.keys().copied().collect()
    }

    pub fn video_tiers(&self) -> Vec<VideoQuality> {
        self.entries
            .keys()
            .filter_map(|tier| match tier {
                QualityTier::Video(quality) => Some(*quality),
                QualityTier::Audio(_) => None
            })
            .collect()
    }

    pub fn audio_tiers(&self) -> Vec<AudioQuality> {
        self.entries
            .keys()
            .filter_map(|tier| match tier {
                QualityTier::Audio(quality) => Some(*quality),
                QualityTier::Video(_) => None
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QualityTier, &StreamCandidate)> {
        self.entries.iter().map(|(tier, candidate)| (*tier, candidate))
    }

    fn insert(&mut self, tier: impl Into<QualityTier>, candidate: &StreamCandidate) {
        self.entries.insert(tier.into(), candidate.clone());
    }
}

impl Serialize for QualityResolvedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tier, candidate) in &self.entries {
            map.serialize_entry(tier, candidate)?;
        }
        map.end()
    }
}

/// Resolves every quality tier for streams in the `ext` container.
///
/// Audio tiers are looked up in `audio_ext`, or in the audio container that
/// pairs with `ext` when none is given. When `ext` has no video streams the
/// map is empty; deciding what to fall back to is left to the caller.
pub fn resolve(
    info: &ExtractedInfo,
    ext: MediaExtension,
    audio_ext: Option<MediaExtension>
) -> QualityResolvedMap {
    let mut map = QualityResolvedMap::empty(ext);

    let videos: Vec<&StreamCandidate> = info
        .formats
        .iter()
        .filter(|f| f.ext == ext.as_str() && f.height.is_some())
        .collect();

    if videos.is_empty() {
        tracing::debug!(id = %info.id, ext = %ext, "no video streams for container");
        return map;
    }

    for quality in VideoQuality::STANDARD {
        let in_band = videos
            .iter()
            .copied()
            .filter(|f| f.height.and_then(VideoQuality::for_height) == Some(quality));
        if let Some(candidate) = tallest(in_band) {
            map.insert(quality, candidate);
        }
    }

    if let Some(candidate) = tallest(videos.iter().copied()) {
        map.insert(VideoQuality::Best, candidate);
    }

    let audio_ext = audio_ext.unwrap_or_else(|| ext.audio_family());
    for (quality, candidate) in rank_audio(info, audio_ext) {
        map.insert(quality, candidate);
    }

    tracing::debug!(
        id = %info.id,
        ext = %ext,
        audio_ext = %audio_ext,
        tiers = ?map.tiers(),
        "resolved quality tiers"
    );

    map
}

/// Resolves only the audio tiers, for sources that may carry no video in
/// the container family of interest.
pub fn resolve_audio(info: &ExtractedInfo, audio_ext: MediaExtension) -> QualityResolvedMap {
    let mut map = QualityResolvedMap::empty(audio_ext);
    for (quality, candidate) in rank_audio(info, audio_ext) {
        map.insert(quality, candidate);
    }
    map
}

/// Tallest candidate; on equal heights the earliest in source order.
fn tallest<'a>(candidates: impl Iterator<Item = &'a StreamCandidate>) -> Option<&'a StreamCandidate> {
    candidates.fold(None, |best: Option<&StreamCandidate>, candidate| match best {
        Some(current) if current.height >= candidate.height => Some(current),
        _ => Some(candidate)
    })
}

fn rank_audio(info: &ExtractedInfo, audio_ext: MediaExtension) -> Vec<(AudioQuality, &StreamCandidate)> {
    let mut ranked: Vec<(f64, &StreamCandidate)> = info
        .formats
        .iter()
        .filter(|f| f.is_audio_only() && f.ext == audio_ext.as_str())
        .filter_map(|f| f.audio_bitrate().map(|bitrate| (bitrate, f)))
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    // Equal bitrates are the same tier; keep the first listed.
    ranked.dedup_by(|later, earlier| later.0 == earlier.0);

    let count = ranked.len();
    AudioQuality::ALL
        .into_iter()
        .filter_map(|quality| {
            let rank = quality.rank_in(count)?;
            Some((quality, ranked[rank].1))
        })
        .collect()
}
