use crate::error::DownloaderError;
use crate::fetcher::Fetch;
use crate::parser::filename_from_url;
use crate::reporter::Reporter;
use crate::types::{DownloadTask, FailureRecord, ProgressEvent, RunStats, UrlEntry};
use csv::QuoteStyle;
use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const FAILURE_LOG: &str = "failed_urls.txt";

pub struct Downloader<F> {
    fetcher: F,
    workers: usize,
}

impl<F: Fetch> Downloader<F> {
    /// At most `workers` fetches run at once; 0 is treated as 1.
    pub fn new(fetcher: F, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Downloads every URL into `output_dir` and returns the final counters.
    ///
    /// Individual failures never abort the run. Outcomes are recorded in the
    /// order the fetches complete, which is also the order of the lines in
    /// `failed_urls.txt`.
    pub async fn download_all<R: Reporter>(
        &self,
        urls: Vec<UrlEntry>,
        output_dir: &Path,
        reporter: &R,
    ) -> Result<RunStats, DownloaderError> {
        tokio::fs::create_dir_all(output_dir).await?;

        let total = urls.len();
        info!("Downloading {} URLs into {} with {} workers", total, output_dir.display(), self.workers);
        reporter.started(total, output_dir);

        let tasks = self.create_download_tasks(urls, output_dir);
        let start_time = Instant::now();
        let mut stats = RunStats::default();

        let mut completions = stream::iter(tasks)
            .map(|task| async move {
                let outcome = self.fetcher.fetch(&task).await;
                (task, outcome)
            })
            .buffer_unordered(self.workers);

        let mut completed = 0;
        while let Some((task, outcome)) = completions.next().await {
            completed += 1;
            debug!("[{}/{}] {}: {:?} ({})", completed, total, task.url, outcome.status, outcome.detail);
            stats.record(&task.url, &outcome);
            reporter.progress(&ProgressEvent {
                completed,
                total,
                outcome,
            });
        }

        stats.elapsed = start_time.elapsed();
        stats.failure_log = match self.write_failure_log(&stats.failures, output_dir).await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to write {}: {}", FAILURE_LOG, e);
                None
            }
        };

        info!(
            "Run finished in {:.2?}: {} succeeded, {} skipped, {} failed",
            stats.elapsed, stats.success_count, stats.skip_count, stats.fail_count
        );
        reporter.finished(&stats);

        Ok(stats)
    }

    fn create_download_tasks(&self, urls: Vec<UrlEntry>, output_dir: &Path) -> Vec<DownloadTask> {
        let tasks: Vec<DownloadTask> = urls
            .into_iter()
            .map(|url| {
                let filename = filename_from_url(&url).to_string();
                let output_path = output_dir.join(&filename);
                DownloadTask {
                    url,
                    filename,
                    output_path,
                }
            })
            .collect();

        info!("Created {} download tasks", tasks.len());
        for task in &tasks {
            debug!("Download task: {} -> {}", task.url, task.output_path.display());
        }
        tasks
    }

    /// Writes one `<url>\t<detail>` line per failure, replacing any previous
    /// log. With no failures the previous log is removed instead.
    async fn write_failure_log(
        &self,
        failures: &[FailureRecord],
        output_dir: &Path,
    ) -> Result<Option<PathBuf>, DownloaderError> {
        let log_path = output_dir.join(FAILURE_LOG);

        if failures.is_empty() {
            match tokio::fs::remove_file(&log_path).await {
                Ok(()) => debug!("Removed stale {}", log_path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(None);
        }

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_path(&log_path)?;

        for failure in failures {
            wtr.write_record([failure.url.as_str(), failure.detail.as_str()])?;
        }

        wtr.flush()?;
        Ok(Some(log_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use async_trait::async_trait;
    use std::cell::RefCell;

    struct NoopReporter;

    impl Reporter for NoopReporter {
        fn started(&self, _total: usize, _output_dir: &Path) {}
        fn progress(&self, _event: &ProgressEvent) {}
        fn finished(&self, _stats: &RunStats) {}
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: RefCell<Vec<ProgressEvent>>,
        finished: RefCell<bool>,
    }

    impl Reporter for RecordingReporter {
        fn started(&self, _total: usize, _output_dir: &Path) {}

        fn progress(&self, event: &ProgressEvent) {
            self.events.borrow_mut().push(event.clone());
        }

        fn finished(&self, _stats: &RunStats) {
            *self.finished.borrow_mut() = true;
        }
    }

    /// Fails every URL containing "bad", succeeds otherwise.
    struct ScriptedFetcher;

    #[async_trait]
    impl Fetch for ScriptedFetcher {
        async fn fetch(&self, task: &DownloadTask) -> Outcome {
            if task.url.contains("bad") {
                Outcome::failed(task.filename.as_str(), "HTTP error: 500")
            } else {
                Outcome::success(task.filename.as_str())
            }
        }
    }

    fn urls(list: &[&str]) -> Vec<UrlEntry> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn tasks_keep_url_and_resolved_path() {
        let downloader = Downloader::new(ScriptedFetcher, 2);
        let dir = Path::new("downloads");

        let tasks = downloader.create_download_tasks(urls(&["http://x/a.bin", "http://x"]), dir);

        assert_eq!(tasks[0].url, "http://x/a.bin");
        assert_eq!(tasks[0].filename, "a.bin");
        assert_eq!(tasks[0].output_path, dir.join("a.bin"));
        assert_eq!(tasks[1].filename, "");
    }

    #[tokio::test]
    async fn counters_add_up_and_progress_reaches_total() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();
        let downloader = Downloader::new(ScriptedFetcher, 3);

        let stats = downloader
            .download_all(
                urls(&["http://x/1", "http://x/bad-2", "http://x/3", "http://x/bad-4", "http://x/5"]),
                dir.path(),
                &reporter,
            )
            .await
            .unwrap();

        assert_eq!(stats.success_count, 3);
        assert_eq!(stats.fail_count, 2);
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.failures.len(), stats.fail_count);

        let events = reporter.events.borrow();
        assert_eq!(events.len(), 5);
        let completed: Vec<usize> = events.iter().map(|e| e.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4, 5]);
        assert_eq!(events[4].percent(), 100.0);
        assert!(*reporter.finished.borrow());
    }

    #[tokio::test]
    async fn zero_workers_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(ScriptedFetcher, 0);

        let stats = downloader
            .download_all(urls(&["http://x/a", "http://x/b"]), dir.path(), &NoopReporter)
            .await
            .unwrap();

        assert_eq!(stats.success_count, 2);
    }

    #[tokio::test]
    async fn creates_nested_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let downloader = Downloader::new(ScriptedFetcher, 1);

        downloader
            .download_all(Vec::new(), &nested, &NoopReporter)
            .await
            .unwrap();
        downloader
            .download_all(Vec::new(), &nested, &NoopReporter)
            .await
            .unwrap();

        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn failure_log_has_one_tab_separated_line_per_failure() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(ScriptedFetcher, 2);

        let stats = downloader
            .download_all(
                urls(&["http://x/bad-a", "http://x/ok", "http://x/bad-b"]),
                dir.path(),
                &NoopReporter,
            )
            .await
            .unwrap();

        let log_path = dir.path().join(FAILURE_LOG);
        assert_eq!(stats.failure_log.as_deref(), Some(log_path.as_path()));

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), stats.fail_count);
        lines.sort();
        assert_eq!(
            lines,
            vec!["http://x/bad-a\tHTTP error: 500", "http://x/bad-b\tHTTP error: 500"]
        );
    }

    #[tokio::test]
    async fn stale_failure_log_is_removed_after_clean_run() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join(FAILURE_LOG);
        std::fs::write(&log_path, "http://x/old\ttimeout\n").unwrap();
        let downloader = Downloader::new(ScriptedFetcher, 2);

        let stats = downloader
            .download_all(urls(&["http://x/ok"]), dir.path(), &NoopReporter)
            .await
            .unwrap();

        assert_eq!(stats.fail_count, 0);
        assert!(stats.failure_log.is_none());
        assert!(!log_path.exists());
    }
}
