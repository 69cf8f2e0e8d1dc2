use crate::error::DownloaderError;
use crate::types::UrlEntry;
use log::debug;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Reads the URL list: one URL per line, trimmed, blank lines dropped,
/// file order kept.
pub async fn load_urls(path: &Path) -> Result<Vec<UrlEntry>, DownloaderError> {
    let mut file = File::open(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => DownloaderError::UrlListNotFound {
            path: path.to_path_buf(),
        },
        _ => DownloaderError::IoError(e),
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .await
        .map_err(DownloaderError::IoError)?;

    let urls: Vec<UrlEntry> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Last segment of the URL path, ignoring query string and fragment.
///
/// No decoding or normalization is applied. A URL whose path ends in `/`, or
/// has no path at all (`http://host`), yields an empty string.
pub fn filename_from_url(url: &str) -> &str {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    let without_query = &url[..end];

    let path = match without_query.find("://") {
        Some(idx) => {
            let rest = &without_query[idx + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("")
        }
        None => without_query,
    };

    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
