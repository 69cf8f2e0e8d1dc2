use crate::types::{DownloadStatus, ProgressEvent, RunStats};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Receives progress from the coordinator. Everything a reporter shows is
/// derived from the arguments of each call.
pub trait Reporter {
    fn started(&self, total: usize, output_dir: &Path);
    fn progress(&self, event: &ProgressEvent);
    fn finished(&self, stats: &RunStats);
}

/// Single progress line updated in place, followed by a summary block on
/// standard output.
pub struct ConsoleReporter {
    pb: ProgressBar,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { pb }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn started(&self, total: usize, output_dir: &Path) {
        self.pb.suspend(|| {
            for line in banner_lines(total, output_dir) {
                println!("{}", line);
            }
        });
        self.pb.set_length(total as u64);
    }

    fn progress(&self, event: &ProgressEvent) {
        self.pb.set_position(event.completed as u64);
        self.pb.set_message(progress_line(event));
    }

    fn finished(&self, stats: &RunStats) {
        self.pb.finish();

        let rule = "=".repeat(50);
        println!("\n{}", rule);
        println!("{}", "Download complete!".bold());
        println!("{}", rule);
        println!("Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
        println!("Succeeded: {}", stats.success_count.to_string().green());
        println!("Skipped (already exists): {}", stats.skip_count.to_string().yellow());
        println!("Failed: {}", stats.fail_count.to_string().red());

        if let Some(path) = &stats.failure_log {
            println!("\nFailed URL list: {}", path.display());
        }
    }
}

pub(crate) fn banner_lines(total: usize, output_dir: &Path) -> [String; 2] {
    let shown = std::fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    [
        format!("Loaded {} URLs.", total.to_string().bold()),
        format!("Download directory: {}", shown.display()),
    ]
}

pub(crate) fn progress_line(event: &ProgressEvent) -> String {
    let detail = match event.outcome.status {
        DownloadStatus::Success => event.outcome.detail.green(),
        DownloadStatus::Skipped => event.outcome.detail.yellow(),
        DownloadStatus::Failed => event.outcome.detail.red(),
    };
    format!(
        "[{:5.1}%] {}/{} - {}: {}",
        event.percent(),
        event.completed,
        event.total,
        event.outcome.filename,
        detail
    )
}
