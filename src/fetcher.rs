use crate::error::{DownloaderError, FetchError};
use crate::types::{DownloadTask, Outcome};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use log::{debug, warn};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Performs a single download attempt and classifies the result.
///
/// Implementations never return an error: every failure is folded into a
/// `Failed` outcome so one bad URL cannot affect the rest of the batch.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, task: &DownloadTask) -> Outcome;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    read_timeout: Duration,
}

impl HttpFetcher {
    /// `timeout` bounds connecting, waiting for the response headers, and
    /// each wait for the next body chunk. A slow body that keeps arriving
    /// is never cut off.
    pub fn new(timeout: Duration) -> Result<Self, DownloaderError> {
        let client = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            read_timeout: timeout,
        })
    }

    async fn download(&self, task: &DownloadTask) -> Result<u64, FetchError> {
        let resp = within(self.read_timeout, self.client.get(task.url.as_str()).send()).await??;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        write_body(&task.output_path, resp.bytes_stream(), self.read_timeout).await
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, task: &DownloadTask) -> Outcome {
        if let Ok(true) = tokio::fs::try_exists(&task.output_path).await {
            debug!("Skipping {}: {} already exists", task.url, task.output_path.display());
            return Outcome::skipped(task.filename.as_str());
        }

        debug!("Starting download: {}", task.url);
        match self.download(task).await {
            Ok(bytes) => {
                debug!("Downloaded {} ({} bytes)", task.url, bytes);
                Outcome::success(task.filename.as_str())
            }
            Err(e) => {
                warn!("Download failed for {}: {}", task.url, e);
                Outcome::failed(task.filename.as_str(), e)
            }
        }
    }
}

async fn within<T>(limit: Duration, fut: impl Future<Output = T>) -> Result<T, FetchError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| FetchError::Timeout)
}

/// Streams `body` into `path`, giving up when no chunk arrives within
/// `read_timeout`.
///
/// The bytes go to a hidden `.part` file next to `path`, which is renamed
/// over `path` only once the whole body is on disk. On failure the `.part`
/// file is removed when its handle drops, and whatever already sits at
/// `path` is left alone.
pub(crate) async fn write_body<S, B, E>(
    path: &Path,
    body: S,
    read_timeout: Duration,
) -> Result<u64, FetchError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<FetchError>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let (std_file, part_path) = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)?
        .into_parts();

    let mut file = File::from_std(std_file);
    let result = copy_stream(&mut file, body, read_timeout).await;
    drop(file);

    let written = result?;
    part_path.persist(path).map_err(|e| FetchError::Io(e.error))?;
    Ok(written)
}

async fn copy_stream<S, B, E>(file: &mut File, body: S, read_timeout: Duration) -> Result<u64, FetchError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<FetchError>,
{
    futures::pin_mut!(body);

    let mut written: u64 = 0;
    while let Some(chunk) = within(read_timeout, body.next()).await? {
        let chunk = chunk.map_err(Into::<FetchError>::into)?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}
