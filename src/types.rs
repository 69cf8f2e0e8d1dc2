use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type UrlEntry = String;

#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub url: UrlEntry,
    pub filename: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Success,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub filename: String,
    pub status: DownloadStatus,
    pub detail: String,
}

impl Outcome {
    pub fn success(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: DownloadStatus::Success,
            detail: "download complete".to_string(),
        }
    }

    pub fn skipped(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: DownloadStatus::Skipped,
            detail: "already exists".to_string(),
        }
    }

    pub fn failed(filename: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            filename: filename.into(),
            status: DownloadStatus::Failed,
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub url: UrlEntry,
    pub detail: String,
}

/// Counters for one run. Only the coordinator mutates these, one outcome at
/// a time, so `failures` is in completion order.
#[derive(Debug, Default)]
pub struct RunStats {
    pub success_count: usize,
    pub skip_count: usize,
    pub fail_count: usize,
    pub failures: Vec<FailureRecord>,
    pub elapsed: Duration,
    pub failure_log: Option<PathBuf>,
}

impl RunStats {
    pub fn record(&mut self, url: &str, outcome: &Outcome) {
        match outcome.status {
            DownloadStatus::Success => self.success_count += 1,
            DownloadStatus::Skipped => self.skip_count += 1,
            DownloadStatus::Failed => {
                self.fail_count += 1;
                self.failures.push(FailureRecord {
                    url: url.to_string(),
                    detail: outcome.detail.clone(),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.skip_count + self.fail_count
    }
}

/// Emitted after each completed task.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub outcome: Outcome,
}

impl ProgressEvent {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}
