use super::QualityResolvedMap;
use crate::error::{Error, Result};
use crate::types::{AudioQuality, QualityTier, StreamCandidate};

impl QualityResolvedMap {
    /// Consumes the map and returns it with `audio_video_size` set on every
    /// entry.
    ///
    /// Video-only entries get their own size plus the size of the stream at
    /// `audio`; every other entry already carries its audio (or is audio) and
    /// gets its own size. An entry without size data of its own gets zero,
    /// and missing audio size data counts as zero.
    pub fn with_audio_video_size(self, audio: AudioQuality) -> Result<Self> {
        let audio_size = self.get(audio).map_or(0, size_or_zero);

        let entries = self
            .entries
            .into_iter()
            .map(|(tier, mut candidate)| -> Result<(QualityTier, StreamCandidate)> {
                let combined = match candidate.estimated_size() {
                    // A video without size data stays unsizable even when the audio is known.
                    None => 0,
                    Some(own) if candidate.is_video_only() => own
                        .checked_add(audio_size)
                        .ok_or_else(|| Error::SizeOverflow(candidate.format_id.clone()))?,
                    Some(own) => own
                };

                let approx = candidate.filesize_approx.unwrap_or(0);
                if combined < approx {
                    return Err(Error::SizeInvariant {
                        format_id: candidate.format_id,
                        combined,
                        approx
                    });
                }

                candidate.audio_video_size = Some(combined);
                Ok((tier, candidate))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            container: self.container,
            entries
        })
    }
}

/// Free-function form of [`QualityResolvedMap::with_audio_video_size`].
pub fn attach_audio_video_size(map: QualityResolvedMap, audio: AudioQuality) -> Result<QualityResolvedMap> {
    map.with_audio_video_size(audio)
}

fn size_or_zero(candidate: &StreamCandidate) -> u64 {
    candidate.estimated_size().unwrap_or(0)
}
