//! HTTP retrieval of the two source datasets.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};

/// Issues a GET for `url` and returns the body. Any non-2xx status is an error.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = reqwest::Url::parse(url).map_err(|e| PipelineError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let network = |source| PipelineError::Network {
        url: url.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(network)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PipelineError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(network)?;
    debug!(bytes = bytes.len(), "Response body received");
    Ok(bytes.to_vec())
}

/// Downloads `url` and writes the body to `path`, replacing any previous file.
///
/// The body goes to a sibling `.part` file first and is renamed over `path`,
/// so a failed write leaves the previous file untouched.
pub async fn download_to_file<C: HttpClient>(client: &C, url: &str, path: &Path) -> Result<()> {
    let bytes = fetch_bytes(client, url).await?;

    let partial = partial_path(path);
    if let Err(e) = write_then_rename(&bytes, &partial, path) {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }

    info!(path = %path.display(), bytes = bytes.len(), "Download saved");
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn write_then_rename(bytes: &[u8], partial: &Path, path: &Path) -> std::io::Result<()> {
    // the handle is closed when `file` drops, on success or on a failed write
    let mut file = std::fs::File::create(partial)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(partial, path)
}

/// Fetches `url` and decodes the body as JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    let bytes = fetch_bytes(client, url).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Where the CSV that feeds the pipeline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvSource {
    /// Downloaded during this run.
    Fresh,
    /// Download failed; a file left by an earlier run is used instead.
    Stale,
}

/// Downloads the CSV to `path`, falling back to an existing file at `path`
/// when the transfer fails. Local I/O errors, and a failed transfer with no
/// previous file, are returned.
pub async fn download_or_reuse<C: HttpClient>(
    client: &C,
    url: &str,
    path: &Path,
) -> Result<CsvSource> {
    match download_to_file(client, url, path).await {
        Ok(()) => Ok(CsvSource::Fresh),
        Err(e @ (PipelineError::Network { .. } | PipelineError::HttpStatus { .. }))
            if path.exists() =>
        {
            warn!(error = %e, path = %path.display(), "Download failed, using previously saved file");
            Ok(CsvSource::Stale)
        }
        Err(e) => Err(e),
    }
}
