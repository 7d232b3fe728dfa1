use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use futures_core::Stream;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::command::CommandBuilder;
use crate::error::{Error, Result};
use crate::types::{
    DownloadEvent, DownloadOptions, DownloadProgress, ExtractedInfo, PROGRESS_TEMPLATE,
    SearchExtractedInfo
};

#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    cookies_file: Option<PathBuf>,
    extra_args: Vec<String>,
    ffmpeg_location: Option<PathBuf>
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary: path.into(),
            cookies_file: None,
            extra_args: Vec::new(),
            ffmpeg_location: None
        }
    }

    pub fn set_cookies_file(&mut self, path: Option<PathBuf>) {
        self.cookies_file = path;
    }

    pub fn set_extra_args(&mut self, args: Vec<String>) {
        self.extra_args = args;
    }

    pub fn set_ffmpeg_location(&mut self, path: Option<PathBuf>) {
        self.ffmpeg_location = path;
    }

    pub async fn check_binary(&self) -> Result<String> {
        let output = Command::new(&self.binary).arg("--version").output().await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(Error::BinaryNotExecutable(self.binary.clone()))
        }
    }

    /// Extracts and validates the metadata of a single media item.
    pub async fn extract_info(&self, url: &str) -> Result<ExtractedInfo> {
        let builder = self.command().json_output().skip_download().no_playlist().url(url);
        let stdout = self.run(&builder).await?;

        let value: Value = serde_json::from_slice(&stdout)?;
        let info = ExtractedInfo::from_value(&value)?;
        tracing::debug!(id = %info.id, formats = info.formats.len(), "extracted info");
        Ok(info)
    }

    /// Runs a text search and validates up to `limit` results, optionally
    /// keeping only items downloadable over a progressive protocol.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        filter_best_protocol: bool
    ) -> Result<SearchExtractedInfo> {
        if limit == 0 {
            return Err(Error::InvalidLimit);
        }

        let builder = self.command().json_output().skip_download().search(query, limit);
        let stdout = self.run(&builder).await?;

        let values = String::from_utf8_lossy(&stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<Value>)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let results = SearchExtractedInfo::from_values(&values, limit)?;
        tracing::debug!(query, found = results.len(), "search finished");

        Ok(if filter_best_protocol {
            results.filter_best_protocol()
        } else {
            results
        })
    }

    pub async fn download(&self, url: &str, options: &DownloadOptions) -> Result<()> {
        let builder = self.command().with_options(options).url(url);
        self.run(&builder).await?;
        Ok(())
    }

    pub fn download_with_progress(
        &self,
        url: &str,
        options: &DownloadOptions
    ) -> Pin<Box<dyn Stream<Item = Result<DownloadEvent>> + Send + '_>> {
        let url = url.to_string();
        let builder = self
            .command()
            .with_options(options)
            .progress_template(PROGRESS_TEMPLATE)
            .url(&url);

        Box::pin(async_stream::try_stream! {
            yield DownloadEvent::Extracting { url: url.clone() };

            tracing::debug!(
                binary = %self.binary.display(),
                args = ?builder.get_args(),
                "spawning yt-dlp"
            );

            let mut cmd = builder.build();
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());

            let mut child = cmd.spawn()?;

            let stderr = child.stderr.take().ok_or_else(|| not_captured("stderr"))?;
            let stderr_task = tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                let mut last_error = None;
                while let Ok(Some(line)) = reader.next_line().await {
                    tracing::trace!(line = %line, "yt-dlp stderr");
                    if let Some(message) = line.strip_prefix("ERROR:") {
                        last_error = Some(message.trim().to_string());
                    }
                }
                last_error
            });

            let stdout = child.stdout.take().ok_or_else(|| not_captured("stdout"))?;
            let mut reader = BufReader::new(stdout).lines();
            let mut current_filename: Option<String> = None;

            while let Some(line) = reader.next_line().await? {
                tracing::trace!(line = %line, "yt-dlp stdout");
                if let Some(event) = parse_output_line(&line, &mut current_filename) {
                    yield event;
                }
            }

            let status = child.wait().await?;
            let last_error = stderr_task.await.ok().flatten();

            if status.success() {
                yield DownloadEvent::Finished {
                    filename: current_filename.unwrap_or_default()
                };
            } else {
                yield DownloadEvent::Error {
                    message: last_error.unwrap_or_else(|| {
                        format!("yt-dlp exited with code {}", status.code().unwrap_or(-1))
                    })
                };
            }
        })
    }

    fn command(&self) -> CommandBuilder {
        let mut builder = CommandBuilder::new(&self.binary)
            .cookies_file_opt(self.cookies_file.as_ref())
            .args(self.extra_args.iter().map(String::as_str));

        if let Some(ref ffmpeg_path) = self.ffmpeg_location {
            builder = builder.ffmpeg_location(ffmpeg_path);
        }

        builder
    }

    async fn run(&self, builder: &CommandBuilder) -> Result<Vec<u8>> {
        tracing::debug!(binary = %self.binary.display(), args = ?builder.get_args(), "running yt-dlp");
        let output = builder.build().output().await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string()
            });
        }

        Ok(output.stdout)
    }
}

fn not_captured(stream: &str) -> Error {
    Error::Io(std::io::Error::other(format!("{stream} not captured")))
}

fn parse_output_line(line: &str, current_filename: &mut Option<String>) -> Option<DownloadEvent> {
    let line = line.trim();

    if let Some(progress) = DownloadProgress::from_template_line(line) {
        return Some(DownloadEvent::Progress(progress));
    }

    if let Some(filename) = line.strip_prefix("[download] Destination:") {
        let filename = filename.trim().to_string();
        *current_filename = Some(filename.clone());
        return Some(DownloadEvent::DownloadStarted { filename });
    }

    if line.starts_with("[Merger]") {
        if let Some(start) = line.find('"')
            && let Some(end) = line.rfind('"')
            && end > start
        {
            *current_filename = Some(line[start + 1..end].to_string());
        }
        return Some(DownloadEvent::MergingFormats);
    }

    if let Some(rest) = line.strip_prefix("[ExtractAudio] Destination:") {
        *current_filename = Some(rest.trim().to_string());
        return Some(DownloadEvent::PostProcessing {
            status: line.to_string()
        });
    }

    if line.starts_with("[EmbedSubtitle]") || line.starts_with("[ffmpeg]") {
        return Some(DownloadEvent::PostProcessing {
            status: line.to_string()
        });
    }

    if let Some(message) = line.strip_prefix("WARNING:") {
        return Some(DownloadEvent::Warning {
            message: message.trim().to_string()
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination() {
        let mut filename = None;
        let event = parse_output_line("[download] Destination: /tmp/video.f137.mp4", &mut filename);
        assert!(matches!(event, Some(DownloadEvent::DownloadStarted { .. })));
        assert_eq!(filename.as_deref(), Some("/tmp/video.f137.mp4"));
    }

    #[test]
    fn test_parse_merger_updates_filename() {
        let mut filename = Some("/tmp/video.f137.mp4".to_string());
        let event = parse_output_line(
            r#"[Merger] Merging formats into "/tmp/video.mp4""#,
            &mut filename
        );
        assert_eq!(event, Some(DownloadEvent::MergingFormats));
        assert_eq!(filename.as_deref(), Some("/tmp/video.mp4"));
    }

    #[test]
    fn test_parse_extract_audio() {
        let mut filename = None;
        let event = parse_output_line("[ExtractAudio] Destination: /tmp/song.mp3", &mut filename);
        assert!(matches!(event, Some(DownloadEvent::PostProcessing { .. })));
        assert_eq!(filename.as_deref(), Some("/tmp/song.mp3"));
    }

    #[test]
    fn test_parse_progress_and_warning() {
        let mut filename = None;
        let event = parse_output_line("download:10 100 NA 5 NA", &mut filename);
        assert!(matches!(event, Some(DownloadEvent::Progress(_))));

        let event = parse_output_line("WARNING: [youtube] falling back", &mut filename);
        assert_eq!(event, Some(DownloadEvent::Warning {
            message: "[youtube] falling back".to_string()
        }));
        assert!(parse_output_line("[youtube] Extracting URL", &mut filename).is_none());
    }

    #[test]
    fn test_ytdlp_default() {
        let client = YtDlp::default();
        assert_eq!(client.binary, PathBuf::from("yt-dlp"));
        assert!(client.cookies_file.is_none());
        assert!(client.extra_args.is_empty());
    }

    #[test]
    fn test_command_carries_client_settings() {
        let mut client = YtDlp::with_binary("/opt/yt-dlp");
        client.set_cookies_file(Some(PathBuf::from("/tmp/cookies.txt")));
        client.set_ffmpeg_location(Some(PathBuf::from("/usr/bin/ffmpeg")));
        client.set_extra_args(vec![
            "--extractor-args".to_string(),
            "youtube:player-client=mweb".to_string()
        ]);
        let builder = client.command().url("https://example.com/v");
        assert_eq!(builder.get_args(), &[
            "--cookies",
            "/tmp/cookies.txt",
            "--extractor-args",
            "youtube:player-client=mweb",
            "--ffmpeg-location",
            "/usr/bin/ffmpeg",
            "https://example.com/v"
        ]);
    }

    #[tokio::test]
    async fn test_search_rejects_zero_limit() {
        let client = YtDlp::with_binary("/nonexistent/yt-dlp");
        let err = client.search("anything", 0, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidLimit));
    }

    #[tokio::test]
    async fn test_progress_stream_reports_spawn_failure() {
        use tokio_stream::StreamExt;

        let client = YtDlp::with_binary("/nonexistent/yt-dlp");
        let options = DownloadOptions::new();
        let mut events = client.download_with_progress("https://example.com/v", &options);

        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first, DownloadEvent::Extracting {
            url: "https://example.com/v".to_string()
        });
        assert!(matches!(events.next().await, Some(Err(Error::Io(_)))));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let client = YtDlp::with_binary("/nonexistent/yt-dlp");
        let err = client.extract_info("https://example.com/v").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
