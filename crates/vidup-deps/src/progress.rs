//! Download progress accounting.

use vidup_core::StatusUpdate;

const MB: f64 = 1024.0 * 1024.0;

/// Bytes received so far and the expected total, when the server sent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Completed fraction in `0.0..=1.0`, if the total is known.
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.downloaded as f64 / total as f64).min(1.0) as f32),
            _ => None,
        }
    }

    /// Whole percentage, if the total is known.
    pub fn percent(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0).floor() as u8)
    }

    pub fn downloaded_mb(&self) -> f64 {
        self.downloaded as f64 / MB
    }

    pub fn total_mb(&self) -> Option<f64> {
        self.total.map(|t| t as f64 / MB)
    }

    /// Status line such as `Downloading FFmpeg... 45% (12.3 / 27.0 MB)`.
    pub fn to_status(&self, label: &str) -> StatusUpdate {
        match (self.percent(), self.total_mb(), self.fraction()) {
            (Some(percent), Some(total_mb), Some(fraction)) => StatusUpdate::with_progress(
                format!(
                    "Downloading {}... {}% ({:.1} / {:.1} MB)",
                    label,
                    percent,
                    self.downloaded_mb(),
                    total_mb
                ),
                fraction,
            ),
            _ => StatusUpdate::message(format!(
                "Downloading {}... {:.1} MB",
                label,
                self.downloaded_mb()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_megabytes() {
        let progress = DownloadProgress {
            downloaded: 5 * 1024 * 1024,
            total: Some(20 * 1024 * 1024),
        };
        assert_eq!(progress.percent(), Some(25));
        assert!((progress.downloaded_mb() - 5.0).abs() < f64::EPSILON);

        let status = progress.to_status("FFmpeg");
        assert_eq!(status.message, "Downloading FFmpeg... 25% (5.0 / 20.0 MB)");
        assert_eq!(status.progress, Some(0.25));
    }

    #[test]
    fn test_unknown_total() {
        let progress = DownloadProgress {
            downloaded: 3 * 1024 * 1024,
            total: None,
        };
        assert_eq!(progress.percent(), None);

        let status = progress.to_status("Real-ESRGAN");
        assert_eq!(status.message, "Downloading Real-ESRGAN... 3.0 MB");
        assert!(status.progress.is_none());
    }

    #[test]
    fn test_zero_total_has_no_fraction() {
        let progress = DownloadProgress {
            downloaded: 0,
            total: Some(0),
        };
        assert!(progress.fraction().is_none());
    }
}
