use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::types::DownloadOptions;

pub struct CommandBuilder {
    binary: PathBuf,
    args: Vec<String>
}

impl CommandBuilder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn url(self, url: impl Into<String>) -> Self {
        self.arg(url)
    }

    pub fn json_output(self) -> Self {
        self.arg("--dump-json")
    }

    pub fn skip_download(self) -> Self {
        self.arg("--skip-download")
    }

    pub fn no_playlist(self) -> Self {
        self.arg("--no-playlist")
    }

    /// `ytsearch<limit>:<query>` pseudo-URL.
    pub fn search(self, query: &str, limit: usize) -> Self {
        self.arg(format!("ytsearch{limit}:{query}"))
    }

    pub fn output_template(self, template: impl Into<String>) -> Self {
        self.arg("-o").arg(template)
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.arg("-f").arg(format)
    }

    pub fn merge_output_format(self, format: impl Into<String>) -> Self {
        self.arg("--merge-output-format").arg(format)
    }

    pub fn extract_audio(self, codec: impl Into<String>) -> Self {
        self.arg("-x").arg("--audio-format").arg(codec)
    }

    pub fn audio_quality(self, quality: impl Into<String>) -> Self {
        self.arg("--audio-quality").arg(quality)
    }

    pub fn subtitles(self, lang: impl Into<String>) -> Self {
        self.arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(lang)
            .arg("--embed-subs")
    }

    pub fn postprocessor_args(self, postprocessor: &str, args: &str) -> Self {
        self.arg("--postprocessor-args").arg(format!("{postprocessor}:{args}"))
    }

    pub fn force_overwrites(self) -> Self {
        self.arg("--force-overwrites")
    }

    pub fn quiet(self) -> Self {
        self.arg("--quiet").arg("--no-warnings")
    }

    pub fn cookies_file_opt(self, path: Option<&PathBuf>) -> Self {
        match path {
            Some(p) => self.arg("--cookies").arg(p.to_string_lossy()),
            None => self
        }
    }

    pub fn ffmpeg_location(self, path: impl AsRef<Path>) -> Self {
        self.arg("--ffmpeg-location").arg(path.as_ref().to_string_lossy())
    }

    pub fn progress_template(self, template: impl Into<String>) -> Self {
        self.arg("--newline").arg("--progress").arg("--progress-template").arg(template)
    }

    pub fn with_options(mut self, options: &DownloadOptions) -> Self {
        if let Some(format_arg) = options.format.as_arg() {
            self = self.format(format_arg);
        }

        if let Some(container) = options.merge_output_format {
            self = self.merge_output_format(container.as_str());
        }

        if let Some(ref template) = options.output_template {
            self = self.output_template(template.clone());
        }

        if let Some(ref lang) = options.subtitle_lang {
            self = self.subtitles(lang.clone());
        }

        if let Some(codec) = options.extract_audio {
            self = self.extract_audio(codec.as_str());
            if let Some(bitrate) = options.audio_bitrate {
                self = self.audio_quality(bitrate.as_arg());
            }
        }

        if let Some(ref codec) = options.merger_audio_codec {
            self = self.postprocessor_args("Merger", &format!("-c:a {codec}"));
        }

        if options.overwrites {
            self = self.force_overwrites();
        }

        if options.quiet {
            self = self.quiet();
        }

        self.args(options.extra_args.iter().cloned())
    }

    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);
        cmd
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{SelectorChain, SelectorStep};
    use crate::types::{AudioBitrate, FormatSelection, MediaExtension};

    #[test]
    fn test_command_builder_extract_info() {
        let builder = CommandBuilder::new("yt-dlp")
            .json_output()
            .skip_download()
            .no_playlist()
            .url("https://example.com/video");
        assert_eq!(builder.get_args(), &[
            "--dump-json",
            "--skip-download",
            "--no-playlist",
            "https://example.com/video"
        ]);
    }

    #[test]
    fn test_command_builder_search() {
        let builder = CommandBuilder::new("yt-dlp").search("lofi beats", 3);
        assert_eq!(builder.get_args(), &["ytsearch3:lofi beats"]);
    }

    #[test]
    fn test_command_builder_cookies_file_opt() {
        let some_path = Some(PathBuf::from("/tmp/cookies.txt"));
        let builder = CommandBuilder::new("yt-dlp").cookies_file_opt(some_path.as_ref());
        assert_eq!(builder.get_args(), &["--cookies", "/tmp/cookies.txt"]);

        let builder = CommandBuilder::new("yt-dlp").cookies_file_opt(None);
        assert!(builder.get_args().is_empty());
    }

    #[test]
    fn test_video_options() {
        let options = DownloadOptions::new()
            .format(FormatSelection::Chain(SelectorChain::new(vec![SelectorStep::Best])))
            .merge_output_format(MediaExtension::Mp4)
            .output_template("/tmp/%(title)s.%(ext)s")
            .subtitle_lang("en")
            .merger_audio_codec("aac")
            .overwrites(true);
        let builder = CommandBuilder::new("yt-dlp").with_options(&options);
        assert_eq!(builder.get_args(), &[
            "-f",
            "best",
            "--merge-output-format",
            "mp4",
            "-o",
            "/tmp/%(title)s.%(ext)s",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            "en",
            "--embed-subs",
            "--postprocessor-args",
            "Merger:-c:a aac",
            "--force-overwrites"
        ]);
    }

    #[test]
    fn test_audio_options() {
        let options = DownloadOptions::new()
            .format(FormatSelection::Pair {
                video: "137".to_string(),
                audio: "140".to_string()
            })
            .extract_audio(MediaExtension::Mp3)
            .audio_bitrate(AudioBitrate::K192)
            .quiet(true);
        let args = CommandBuilder::new("yt-dlp").with_options(&options).get_args().to_vec();
        assert_eq!(args, vec![
            "-f",
            "137+140",
            "-x",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "192K",
            "--quiet",
            "--no-warnings"
        ]);
    }

    #[test]
    fn test_bitrate_ignored_without_extraction() {
        let options = DownloadOptions::new().audio_bitrate(AudioBitrate::K64);
        assert!(CommandBuilder::new("yt-dlp").with_options(&options).get_args().is_empty());
    }

    #[test]
    fn test_command_builder_ffmpeg_location() {
        let builder = CommandBuilder::new("yt-dlp").ffmpeg_location("/usr/local/bin/ffmpeg");
        assert_eq!(builder.get_args(), &["--ffmpeg-location", "/usr/local/bin/ffmpeg"]);
    }
}
