use std::path::PathBuf;

use crate::types::{MediaExtension, QualityTier, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("yt-dlp binary not executable: {0}")]
    BinaryNotExecutable(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yt-dlp command failed with exit code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("failed to parse JSON output: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown quality label: {0}")]
    InvalidQuality(String),

    #[error("unknown media extension: {0}")]
    InvalidExtension(String),

    #[error("unknown audio bitrate: {0}")]
    InvalidBitrate(String),

    #[error("search limit must be positive")]
    InvalidLimit,

    #[error(
        "quality {requested} is not available for {container}; available: {}",
        display_tiers(.available)
    )]
    UnresolvedTier {
        requested: QualityTier,
        container: MediaExtension,
        available: Vec<QualityTier>
    },

    #[error("combined size {combined} of format {format_id} is below its approximate size {approx}")]
    SizeInvariant {
        format_id: String,
        combined: u64,
        approx: u64
    },

    #[error("combined size of format {0} overflows")]
    SizeOverflow(String),

    #[error("no audio streams available")]
    NoAudioStreams
}

fn display_tiers(tiers: &[QualityTier]) -> String {
    if tiers.is_empty() {
        return "none".to_string();
    }
    tiers
        .iter()
        .map(QualityTier::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
