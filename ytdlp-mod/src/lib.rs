//! Validated yt-dlp metadata and quality-tier resolution.
//!
//! This library turns the JSON emitted by `yt-dlp --dump-json` into
//! validated records, maps the available streams onto a fixed set of
//! quality tiers, and builds the format selector strings used to download
//! a chosen tier.
//!
//! # Example
//!
//! ```no_run
//! use ytdlp_mod::{
//!     AudioQuality, DownloadOptions, FormatSelection, MediaExtension, SelectorBuilder,
//!     VideoQuality, YtDlp, resolve
//! };
//!
//! #[tokio::main]
//! async fn main() -> ytdlp_mod::Result<()> {
//!     let client = YtDlp::new();
//!
//!     let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
//!     let info = client.extract_info(url).await?;
//!     println!("Title: {}", info.title);
//!
//!     let map = resolve(&info, MediaExtension::Mp4, Some(MediaExtension::M4a));
//!     let fallback = map.get(AudioQuality::Medium);
//!     let selection = SelectorBuilder::default().build(&map, VideoQuality::P720, fallback)?;
//!
//!     let options = DownloadOptions::new()
//!         .format(FormatSelection::Chain(selection.chain))
//!         .merge_output_format(MediaExtension::Mp4);
//!     client.download(info.url().unwrap_or(url), &options).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod command;
pub mod error;
pub mod resolver;
pub mod selector;
pub mod types;

pub use client::YtDlp;
pub use error::{Error, Result};
pub use resolver::{QualityResolvedMap, attach_audio_video_size, resolve, resolve_audio};
pub use selector::{
    AudioPick, Degradation, Selection, SelectorBuilder, SelectorChain, SelectorStep, VideoPick
};
pub use types::{
    AudioBitrate, AudioQuality, DEFAULT_OUTPUT_TEMPLATE, DownloadEvent, DownloadOptions,
    DownloadProgress, ExtractedInfo, FieldIssue, FormatSelection, IssueKind, MediaExtension,
    PREFERRED_PROTOCOLS, QualityTier, SearchExtractedInfo, StreamCandidate, ValidationError,
    VideoQuality, format_bytes
};
