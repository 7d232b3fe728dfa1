use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VideoQuality {
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
    P4320,
    Best
}

impl VideoQuality {
    /// Tiers with a reference height, lowest first.
    pub const STANDARD: [Self; 9] = [
        Self::P144,
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
        Self::P2160,
        Self::P4320
    ];

    pub const ALL: [Self; 10] = [
        Self::P144,
        Self::P240,
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
        Self::P2160,
        Self::P4320,
        Self::Best
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P144 => "144p",
            Self::P240 => "240p",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::P1440 => "1440p",
            Self::P2160 => "2160p",
            Self::P4320 => "4320p",
            Self::Best => "best"
        }
    }

    pub fn reference_height(self) -> Option<u32> {
        match self {
            Self::P144 => Some(144),
            Self::P240 => Some(240),
            Self::P360 => Some(360),
            Self::P480 => Some(480),
            Self::P720 => Some(720),
            Self::P1080 => Some(1080),
            Self::P1440 => Some(1440),
            Self::P2160 => Some(2160),
            Self::P4320 => Some(4320),
            Self::Best => None
        }
    }

    /// The standard tier whose band holds `height`: the lowest tier whose
    /// reference height is at least `height`. A 1036 pixel letterboxed
    /// stream therefore counts as 1080p.
    pub fn for_height(height: u32) -> Option<Self> {
        Self::STANDARD
            .into_iter()
            .find(|quality| quality.reference_height().is_some_and(|h| h >= height))
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoQuality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        let label = match label.as_str() {
            "2k" => "1440p",
            "4k" => "2160p",
            "8k" => "4320p",
            other => other
        };
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str() == label)
            .ok_or_else(|| Error::InvalidQuality(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioQuality {
    UltraLow,
    Low,
    Medium,
    BestAudio
}

impl AudioQuality {
    pub const ALL: [Self; 4] = [Self::UltraLow, Self::Low, Self::Medium, Self::BestAudio];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UltraLow => "ultralow",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::BestAudio => "bestaudio"
        }
    }

    /// Position, in a list of `count` distinct bitrates sorted ascending, of
    /// the stream this tier stands for.
    ///
    /// Sources disagree on absolute bitrates for the same perceptual tier, so
    /// tiers are assigned by relative rank: ultralow is the lowest, bestaudio
    /// the highest, and low/medium sit at the one-third and two-thirds marks.
    /// With fewer than three bitrates tiers share streams: one bitrate backs
    /// every tier, two bitrates give ultralow and low the lower one.
    pub fn rank_in(self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let rank = match self {
            Self::UltraLow => 0,
            Self::Low => count / 3,
            Self::Medium => count * 2 / 3,
            Self::BestAudio => count - 1
        };
        Some(rank.min(count - 1))
    }

    /// Tiers backed by the stream at `rank` among `count` distinct bitrates.
    pub fn for_rank(rank: usize, count: usize) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |quality| quality.rank_in(count) == Some(rank))
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioQuality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str() == label)
            .ok_or_else(|| Error::InvalidQuality(s.to_string()))
    }
}

/// One label of the combined video/audio label space. Video tiers order
/// before audio tiers, each group lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityTier {
    Video(VideoQuality),
    Audio(AudioQuality)
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video(quality) => quality.as_str(),
            Self::Audio(quality) => quality.as_str()
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }
}

impl From<VideoQuality> for QualityTier {
    fn from(quality: VideoQuality) -> Self {
        Self::Video(quality)
    }
}

impl From<AudioQuality> for QualityTier {
    fn from(quality: AudioQuality) -> Self {
        Self::Audio(quality)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<VideoQuality>()
            .map(Self::Video)
            .or_else(|_| s.parse::<AudioQuality>().map(Self::Audio))
    }
}

impl Serialize for QualityTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaExtension {
    Webm,
    Mp4,
    M4a,
    Mp3
}

impl MediaExtension {
    pub const ALL: [Self; 4] = [Self::Webm, Self::Mp4, Self::M4a, Self::Mp3];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::M4a => "m4a",
            Self::Mp3 => "mp3"
        }
    }

    pub fn is_video_container(self) -> bool {
        matches!(self, Self::Webm | Self::Mp4)
    }

    /// Audio container that muxes cleanly into this one.
    pub fn audio_family(self) -> Self {
        match self {
            Self::Mp4 | Self::M4a => Self::M4a,
            Self::Webm | Self::Mp3 => Self::Webm
        }
    }

    /// Container to look streams up in when this is the requested output.
    /// Audio-only outputs are produced from webm sources and converted.
    pub fn source_container(self) -> Self {
        if self.is_video_container() { self } else { Self::Webm }
    }
}

impl fmt::Display for MediaExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaExtension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == ext)
            .ok_or_else(|| Error::InvalidExtension(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioBitrate {
    K64,
    K96,
    K128,
    K192,
    K256,
    K320
}

impl AudioBitrate {
    pub const ALL: [Self; 6] = [Self::K64, Self::K96, Self::K128, Self::K192, Self::K256, Self::K320];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::K64 => "64k",
            Self::K96 => "96k",
            Self::K128 => "128k",
            Self::K192 => "192k",
            Self::K256 => "256k",
            Self::K320 => "320k"
        }
    }

    pub fn kbps(self) -> u32 {
        match self {
            Self::K64 => 64,
            Self::K96 => 96,
            Self::K128 => 128,
            Self::K192 => 192,
            Self::K256 => 256,
            Self::K320 => 320
        }
    }

    /// Value for yt-dlp's `--audio-quality`.
    pub fn as_arg(self) -> String {
        format!("{}K", self.kbps())
    }
}

impl fmt::Display for AudioBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioBitrate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|bitrate| bitrate.as_str() == label)
            .ok_or_else(|| Error::InvalidBitrate(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for quality in VideoQuality::ALL {
            assert_eq!(quality.as_str().parse::<VideoQuality>().unwrap(), quality);
        }
        for quality in AudioQuality::ALL {
            assert_eq!(quality.to_string().parse::<QualityTier>().unwrap(), QualityTier::Audio(quality));
        }
        for bitrate in AudioBitrate::ALL {
            assert_eq!(bitrate.as_str().parse::<AudioBitrate>().unwrap(), bitrate);
        }
    }

    #[test]
    fn test_resolution_aliases() {
        assert_eq!("2k".parse::<VideoQuality>().unwrap(), VideoQuality::P1440);
        assert_eq!("4K".parse::<VideoQuality>().unwrap(), VideoQuality::P2160);
        assert_eq!("8k".parse::<VideoQuality>().unwrap(), VideoQuality::P4320);
    }

    #[test]
    fn test_unknown_labels_rejected() {
        assert!(matches!("900p".parse::<VideoQuality>(), Err(Error::InvalidQuality(_))));
        assert!(matches!("high".parse::<QualityTier>(), Err(Error::InvalidQuality(_))));
        assert!(matches!("flac".parse::<MediaExtension>(), Err(Error::InvalidExtension(_))));
        assert!(matches!("100k".parse::<AudioBitrate>(), Err(Error::InvalidBitrate(_))));
    }

    #[test]
    fn test_for_height() {
        assert_eq!(VideoQuality::for_height(720), Some(VideoQuality::P720));
        assert_eq!(VideoQuality::for_height(1036), Some(VideoQuality::P1080));
        assert_eq!(VideoQuality::for_height(721), Some(VideoQuality::P1080));
        assert_eq!(VideoQuality::for_height(90), Some(VideoQuality::P144));
        assert_eq!(VideoQuality::for_height(4320), Some(VideoQuality::P4320));
        assert_eq!(VideoQuality::for_height(4400), None);
    }

    #[test]
    fn test_audio_rank_assignment() {
        let ranks = |count| AudioQuality::ALL.map(|q| q.rank_in(count));
        assert_eq!(ranks(0), [None; 4]);
        assert_eq!(ranks(1), [Some(0), Some(0), Some(0), Some(0)]);
        assert_eq!(ranks(2), [Some(0), Some(0), Some(1), Some(1)]);
        assert_eq!(ranks(3), [Some(0), Some(1), Some(2), Some(2)]);
        assert_eq!(ranks(4), [Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_for_rank() {
        let tiers: Vec<_> = AudioQuality::for_rank(1, 2).collect();
        assert_eq!(tiers, vec![AudioQuality::Medium, AudioQuality::BestAudio]);
        assert_eq!(AudioQuality::for_rank(5, 2).count(), 0);
    }

    #[test]
    fn test_container_family() {
        assert_eq!(MediaExtension::Mp4.audio_family(), MediaExtension::M4a);
        assert_eq!(MediaExtension::Webm.audio_family(), MediaExtension::Webm);
        assert_eq!(MediaExtension::Mp3.source_container(), MediaExtension::Webm);
        assert_eq!(MediaExtension::Mp4.source_container(), MediaExtension::Mp4);
        assert_eq!(".MP4".parse::<MediaExtension>().unwrap(), MediaExtension::Mp4);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(QualityTier::Video(VideoQuality::Best) < QualityTier::Audio(AudioQuality::UltraLow));
        assert!(VideoQuality::P720 < VideoQuality::P1080);
        assert_eq!(AudioBitrate::K192.as_arg(), "192K");
    }
}
