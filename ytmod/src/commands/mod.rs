pub mod audio;
pub mod formats;
pub mod video;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use tokio_stream::StreamExt;
use ytdlp_mod::{DownloadEvent, DownloadOptions, ExtractedInfo, YtDlp, format_bytes};

pub use audio::AudioArgs;
pub use formats::FormatsArgs;
pub use video::VideoArgs;

pub struct Context {
    pub client: YtDlp,
    pub quiet: bool
}

impl Context {
    pub async fn extract(&self, url: &str) -> anyhow::Result<ExtractedInfo> {
        self.client
            .extract_info(url)
            .await
            .with_context(|| format!("failed to extract info for {url}"))
    }

    /// Runs the download and renders its progress on stderr.
    pub async fn download(&self, url: &str, options: &DownloadOptions) -> anyhow::Result<()> {
        let mut events = self.client.download_with_progress(url, options);
        let mut stderr = std::io::stderr();

        while let Some(event) = events.next().await {
            match event? {
                DownloadEvent::Extracting { url } => tracing::debug!("Extracting {}", url),
                DownloadEvent::DownloadStarted { filename } => {
                    tracing::info!("Downloading to {}", filename);
                }
                DownloadEvent::Progress(progress) => {
                    if self.quiet {
                        continue;
                    }
                    let percent = progress.percent().map_or_else(|| "?".to_string(), |p| format!("{p:.1}"));
                    let _ = write!(
                        stderr,
                        "\r  {}% of {} at {} ETA {}   ",
                        percent,
                        progress.total_bytes.map_or_else(|| "?".to_string(), format_bytes),
                        progress.format_speed().unwrap_or_else(|| "?".to_string()),
                        progress.format_eta().unwrap_or_else(|| "?".to_string())
                    );
                    let _ = stderr.flush();
                }
                DownloadEvent::MergingFormats => tracing::info!("Merging formats"),
                DownloadEvent::PostProcessing { status } => tracing::debug!("{}", status),
                DownloadEvent::Warning { message } => tracing::warn!("{}", message),
                DownloadEvent::Finished { filename } => {
                    if !self.quiet {
                        let _ = writeln!(stderr);
                    }
                    tracing::info!("Finished: {}", filename);
                }
                DownloadEvent::Error { message } => bail!("download failed: {message}")
            }
        }

        Ok(())
    }
}

/// Checks that `dir` is an existing directory the current user can create
/// files in.
pub fn output_dir(dir: &Path) -> anyhow::Result<PathBuf> {
    let metadata = std::fs::metadata(dir)
        .with_context(|| format!("output directory {} does not exist", dir.display()))?;

    if !metadata.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let check = dir.join(format!(".ytmod-write-check-{}", std::process::id()));
    std::fs::File::create(&check)
        .with_context(|| format!("output directory {} is not writable", dir.display()))?;
    std::fs::remove_file(&check)
        .with_context(|| format!("failed to remove {}", check.display()))?;

    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_accepts_existing_directory() {
        let dir = std::env::temp_dir();
        assert_eq!(output_dir(&dir).unwrap(), dir);
    }

    #[test]
    fn test_output_dir_rejects_missing_path() {
        let missing = std::env::temp_dir().join("ytmod-missing-output-dir");
        let err = output_dir(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_output_dir_leaves_no_files_behind() {
        let dir = std::env::temp_dir().join(format!("ytmod-output-dir-clean-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        output_dir(&dir).unwrap();
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        std::fs::remove_dir(&dir).unwrap();
    }

    #[test]
    fn test_output_dir_rejects_file() {
        let file = std::env::temp_dir().join("ytmod-output-dir-file");
        std::fs::write(&file, b"x").unwrap();
        let err = output_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
        std::fs::remove_file(&file).unwrap();
    }
}
