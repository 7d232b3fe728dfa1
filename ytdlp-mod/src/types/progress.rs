/// Fields requested from yt-dlp through `--progress-template`, in order.
pub(crate) const PROGRESS_TEMPLATE: &str = "download:%(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s %(progress.speed)s %(progress.eta)s";

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub speed: Option<f64>,
    pub eta: Option<f64>
}

impl DownloadProgress {
    /// Parses a line printed with [`PROGRESS_TEMPLATE`]. Unknown values come
    /// through as `NA`.
    pub(crate) fn from_template_line(line: &str) -> Option<Self> {
        let content = line.strip_prefix("download:")?;
        let mut fields = content.split_whitespace().map(parse_number);

        let downloaded_bytes = fields.next()??;
        let total_bytes = fields.next().flatten();
        let estimate = fields.next().flatten();
        let speed = fields.next().flatten();
        let eta = fields.next().flatten();

        Some(Self {
            downloaded_bytes: to_bytes(downloaded_bytes),
            total_bytes: total_bytes.or(estimate).map(to_bytes),
            speed,
            eta
        })
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .map(|total| self.downloaded_bytes as f64 / total as f64 * 100.0)
    }

    pub fn format_speed(&self) -> Option<String> {
        self.speed.map(|s| format!("{}/s", format_bytes(to_bytes(s))))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn format_eta(&self) -> Option<String> {
        self.eta.map(|e| {
            let secs = e as u64;
            let mins = secs / 60;
            let hours = mins / 60;
            if hours > 0 {
                format!("{}:{:02}:{:02}", hours, mins % 60, secs % 60)
            } else {
                format!("{}:{:02}", mins, secs % 60)
            }
        })
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_bytes(n: f64) -> u64 {
    n as u64
}

#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.2} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.2} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{bytes} B")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Extracting { url: String },
    DownloadStarted { filename: String },
    Progress(DownloadProgress),
    MergingFormats,
    PostProcessing { status: String },
    Finished { filename: String },
    Warning { message: String },
    Error { message: String }
}

impl DownloadEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, DownloadEvent::Error { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, DownloadEvent::Finished { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_line() {
        let progress =
            DownloadProgress::from_template_line("download:1048576 4194304 NA 524288.5 6").unwrap();
        assert_eq!(progress.downloaded_bytes, 1_048_576);
        assert_eq!(progress.total_bytes, Some(4_194_304));
        assert_eq!(progress.percent(), Some(25.0));
        assert_eq!(progress.format_eta(), Some("0:06".to_string()));
    }

    #[test]
    fn test_template_line_uses_estimate() {
        let progress = DownloadProgress::from_template_line("download:500 NA 1000.0 NA NA").unwrap();
        assert_eq!(progress.total_bytes, Some(1000));
        assert_eq!(progress.speed, None);
        assert_eq!(progress.percent(), Some(50.0));
    }

    #[test]
    fn test_not_a_progress_line() {
        assert!(DownloadProgress::from_template_line("[download] Destination: a.mp4").is_none());
        assert!(DownloadProgress::from_template_line("download:NA NA NA NA NA").is_none());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1_500), "1.50 KB");
        assert_eq!(format_bytes(35_022_567), "35.02 MB");
        assert_eq!(format_bytes(2_000_000_000), "2.00 GB");
    }

    #[test]
    fn test_eta_hours() {
        let progress = DownloadProgress {
            downloaded_bytes: 0,
            total_bytes: None,
            speed: Some(2_500_000.0),
            eta: Some(3725.0)
        };
        assert_eq!(progress.format_eta(), Some("1:02:05".to_string()));
        assert_eq!(progress.format_speed(), Some("2.50 MB/s".to_string()));
        assert_eq!(progress.percent(), None);
    }
}
