use std::path::Path;

use super::quality::{AudioBitrate, MediaExtension};
use crate::selector::SelectorChain;

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormatSelection {
    #[default]
    Default,
    Chain(SelectorChain),
    Pair { video: String, audio: String }
}

impl FormatSelection {
    pub fn as_arg(&self) -> Option<String> {
        match self {
            FormatSelection::Default => None,
            FormatSelection::Chain(chain) => Some(chain.to_string()),
            FormatSelection::Pair { video, audio } => Some(format!("{video}+{audio}"))
        }
    }
}

/// Everything the download engine needs for one run.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub format: FormatSelection,
    pub merge_output_format: Option<MediaExtension>,
    pub output_template: Option<String>,
    pub subtitle_lang: Option<String>,
    pub extract_audio: Option<MediaExtension>,
    pub audio_bitrate: Option<AudioBitrate>,
    pub merger_audio_codec: Option<String>,
    pub overwrites: bool,
    pub quiet: bool,
    pub extra_args: Vec<String>
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn format(mut self, format: FormatSelection) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn merge_output_format(mut self, container: MediaExtension) -> Self {
        self.merge_output_format = Some(container);
        self
    }

    #[must_use]
    pub fn output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }

    /// Writes into `dir` using [`DEFAULT_OUTPUT_TEMPLATE`].
    #[must_use]
    pub fn output_dir(self, dir: impl AsRef<Path>) -> Self {
        let template = dir.as_ref().join(DEFAULT_OUTPUT_TEMPLATE);
        self.output_template(template.to_string_lossy())
    }

    /// Fetches (auto-generated if needed) subtitles in `lang` and embeds them.
    #[must_use]
    pub fn subtitle_lang(mut self, lang: impl Into<String>) -> Self {
        self.subtitle_lang = Some(lang.into());
        self
    }

    #[must_use]
    pub fn extract_audio(mut self, codec: MediaExtension) -> Self {
        self.extract_audio = Some(codec);
        self
    }

    #[must_use]
    pub fn audio_bitrate(mut self, bitrate: AudioBitrate) -> Self {
        self.audio_bitrate = Some(bitrate);
        self
    }

    /// Re-encodes audio with `codec` when the merger muxes streams.
    #[must_use]
    pub fn merger_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.merger_audio_codec = Some(codec.into());
        self
    }

    #[must_use]
    pub fn overwrites(mut self, overwrites: bool) -> Self {
        self.overwrites = overwrites;
        self
    }

    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_selection() {
        let selection = FormatSelection::Pair {
            video: "137".to_string(),
            audio: "140".to_string()
        };
        assert_eq!(selection.as_arg(), Some("137+140".to_string()));
        assert_eq!(FormatSelection::Default.as_arg(), None);
    }

    #[test]
    fn test_output_dir_template() {
        let options = DownloadOptions::new().output_dir("/tmp/videos");
        assert_eq!(options.output_template.as_deref(), Some("/tmp/videos/%(title)s.%(ext)s"));
    }
}
