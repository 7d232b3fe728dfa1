//! Fallback-aware format selectors.
//!
//! A selector is kept as an ordered list of [`SelectorStep`]s and only turned
//! into yt-dlp's `-f` syntax (`137+bestaudio[ext=m4a]/137+140/137/best`) by
//! its `Display` impl.

use std::fmt;

use crate::error::{Error, Result};
use crate::resolver::QualityResolvedMap;
use crate::types::{AudioQuality, MediaExtension, QualityTier, StreamCandidate, VideoQuality};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoPick {
    Format(String),
    BestVideo
}

impl fmt::Display for VideoPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoPick::Format(id) => f.write_str(id),
            VideoPick::BestVideo => f.write_str("bestvideo")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPick {
    Format(String),
    BestWithExt(MediaExtension),
    Best
}

impl fmt::Display for AudioPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioPick::Format(id) => f.write_str(id),
            AudioPick::BestWithExt(ext) => write!(f, "bestaudio[ext={ext}]"),
            AudioPick::Best => f.write_str("bestaudio")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStep {
    /// A video stream, muxed with `audio` when given.
    Video { video: VideoPick, audio: Option<AudioPick> },
    Audio(AudioPick),
    /// yt-dlp's own best single-file choice.
    Best
}

impl fmt::Display for SelectorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorStep::Video { video, audio: Some(audio) } => write!(f, "{video}+{audio}"),
            SelectorStep::Video { video, audio: None } => write!(f, "{video}"),
            SelectorStep::Audio(audio) => write!(f, "{audio}"),
            SelectorStep::Best => f.write_str("best")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorChain(Vec<SelectorStep>);

impl SelectorChain {
    pub fn new(steps: Vec<SelectorStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[SelectorStep] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// The requested tier was missing and a neighbouring one was used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degradation {
    pub requested: VideoQuality,
    pub substituted: VideoQuality
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requested quality {} not found, falling back to {}",
            self.requested, self.substituted
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub chain: SelectorChain,
    /// Tier the chain was built for.
    pub quality: VideoQuality,
    pub target: Option<StreamCandidate>,
    pub degradation: Option<Degradation>
}

#[derive(Debug, Clone, Copy)]
pub struct SelectorBuilder {
    preferred_audio_ext: MediaExtension
}

impl Default for SelectorBuilder {
    fn default() -> Self {
        Self::new(MediaExtension::M4a)
    }
}

impl SelectorBuilder {
    pub fn new(preferred_audio_ext: MediaExtension) -> Self {
        Self { preferred_audio_ext }
    }

    /// Chain for an explicit target stream:
    /// target with preferred audio, target with `fallback_audio`, target
    /// alone, then yt-dlp's best.
    pub fn for_target(&self, target: &StreamCandidate, fallback_audio: Option<&StreamCandidate>) -> SelectorChain {
        let video = VideoPick::Format(target.format_id.clone());
        let fallback = fallback_audio.map_or(AudioPick::Best, |audio| AudioPick::Format(audio.format_id.clone()));

        SelectorChain::new(vec![
            SelectorStep::Video {
                video: video.clone(),
                audio: Some(AudioPick::BestWithExt(self.preferred_audio_ext))
            },
            SelectorStep::Video {
                video: video.clone(),
                audio: Some(fallback)
            },
            SelectorStep::Video { video, audio: None },
            SelectorStep::Best
        ])
    }

    fn for_best(&self) -> SelectorChain {
        SelectorChain::new(vec![
            SelectorStep::Video {
                video: VideoPick::BestVideo,
                audio: Some(AudioPick::BestWithExt(self.preferred_audio_ext))
            },
            SelectorStep::Video {
                video: VideoPick::BestVideo,
                audio: Some(AudioPick::Best)
            },
            SelectorStep::Best
        ])
    }

    /// Builds the selector for `requested` out of a resolved map.
    ///
    /// A missing tier is replaced by the highest present tier below it, or
    /// the lowest present tier above it when nothing lower exists, and the
    /// swap is reported through [`Selection::degradation`].
    pub fn build(
        &self,
        map: &QualityResolvedMap,
        requested: VideoQuality,
        fallback_audio: Option<&StreamCandidate>
    ) -> Result<Selection> {
        if map.video_tiers().is_empty() {
            return Err(Error::UnresolvedTier {
                requested: requested.into(),
                container: map.container(),
                available: map.tiers()
            });
        }

        if requested == VideoQuality::Best {
            return Ok(Selection {
                chain: self.for_best(),
                quality: requested,
                target: map.get(requested).cloned(),
                degradation: None
            });
        }

        let (quality, degradation) = if map.contains(requested) {
            (requested, None)
        } else {
            let substituted = substitute(map, requested).ok_or_else(|| Error::UnresolvedTier {
                requested: requested.into(),
                container: map.container(),
                available: map.tiers()
            })?;
            tracing::debug!(%requested, %substituted, "requested quality unavailable, substituting");
            (substituted, Some(Degradation { requested, substituted }))
        };

        let target = map.get(quality).ok_or_else(|| Error::UnresolvedTier {
            requested: requested.into(),
            container: map.container(),
            available: map.tiers()
        })?;

        Ok(Selection {
            chain: self.for_target(target, fallback_audio),
            quality,
            target: Some(target.clone()),
            degradation
        })
    }

    /// Selector for an audio-only download at `quality`.
    pub fn build_audio(&self, map: &QualityResolvedMap, quality: AudioQuality) -> Result<SelectorChain> {
        if quality == AudioQuality::BestAudio {
            return Ok(SelectorChain::new(vec![SelectorStep::Audio(AudioPick::Best)]));
        }

        let candidate = map.get(quality).ok_or_else(|| Error::UnresolvedTier {
            requested: quality.into(),
            container: map.container(),
            available: map.audio_tiers().into_iter().map(QualityTier::Audio).collect()
        })?;

        Ok(SelectorChain::new(vec![
            SelectorStep::Audio(AudioPick::Format(candidate.format_id.clone())),
            SelectorStep::Audio(AudioPick::Best)
        ]))
    }
}

fn substitute(map: &QualityResolvedMap, requested: VideoQuality) -> Option<VideoQuality> {
    let present = map.video_tiers();
    let standard = present.iter().copied().filter(|quality| *quality != VideoQuality::Best);

    standard
        .clone()
        .filter(|quality| *quality < requested)
        .next_back()
        .or_else(|| standard.clone().find(|quality| *quality > requested))
        .or_else(|| present.contains(&VideoQuality::Best).then_some(VideoQuality::Best))
}
