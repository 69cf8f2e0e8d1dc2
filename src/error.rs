use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("URL list not found: {}", path.display())]
    UrlListNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Why a single download failed. The `Display` text is what ends up in the
/// outcome detail and in `failed_urls.txt`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e)
        }
    }
}
