mod info;
mod options;
mod progress;
mod quality;
mod search;
pub(crate) mod validate;

pub use info::{ExtractedInfo, StreamCandidate};
pub use options::{DEFAULT_OUTPUT_TEMPLATE, DownloadOptions, FormatSelection};
pub(crate) use progress::PROGRESS_TEMPLATE;
pub use progress::{DownloadEvent, DownloadProgress, format_bytes};
pub use quality::{AudioBitrate, AudioQuality, MediaExtension, QualityTier, VideoQuality};
pub use search::{PREFERRED_PROTOCOLS, SearchExtractedInfo};
pub use validate::{FieldIssue, IssueKind, ValidationError};
