//! Dataset acquisition
//!
//! Resolves where a dataset file lives before it is loaded. Remote datasets
//! are downloaded once into the cache directory and reused on later starts.
//! Downloads are streamed into a `.part` file that is renamed into place only
//! after the body has been fully written, so an interrupted download is never
//! mistaken for a cached copy.

use greenbite_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Local(PathBuf),
    Remote { url: String, cache_path: PathBuf },
}

impl DatasetSource {
    /// Remote source cached under `cache_dir`, named after the URL's last segment
    pub fn remote(url: impl Into<String>, cache_dir: &Path, fallback_name: &str) -> Self {
        let url = url.into();
        let file_name = url
            .split('?')
            .next()
            .and_then(|u| u.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback_name)
            .to_string();
        DatasetSource::Remote {
            url,
            cache_path: cache_dir.join(file_name),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Local(path) => path.display().to_string(),
            DatasetSource::Remote { url, .. } => url.clone(),
        }
    }
}

/// Return a local path holding the dataset, downloading it if needed
pub async fn fetch(source: &DatasetSource) -> Result<PathBuf> {
    match source {
        DatasetSource::Local(path) => {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                Ok(path.clone())
            } else {
                Err(Error::ReferenceDataUnavailable(format!(
                    "Dataset file not found: {}",
                    path.display()
                )))
            }
        }
        DatasetSource::Remote { url, cache_path } => {
            if tokio::fs::try_exists(cache_path).await.unwrap_or(false) {
                info!(path = %cache_path.display(), "Using cached dataset");
                return Ok(cache_path.clone());
            }
            download(url, cache_path).await?;
            Ok(cache_path.clone())
        }
    }
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    info!(url = %url, dest = %dest.display(), "Downloading dataset");

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::Download(format!("Cannot create cache dir {}: {}", parent.display(), e))
        })?;
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Download(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Download(format!("{}: HTTP {}", url, status.as_u16())));
    }

    let part = dest.with_extension("part");
    let bytes = match stream_to_file(url, &mut response, &part).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };
    tokio::fs::rename(&part, dest).await.map_err(|e| {
        warn!(path = %part.display(), "Leaving partial download behind");
        Error::Download(format!("Cannot move download into place: {}", e))
    })?;

    info!(dest = %dest.display(), bytes, "Dataset downloaded");
    Ok(())
}

/// Write the response body to `path` chunk by chunk, returning the byte count
async fn stream_to_file(url: &str, response: &mut reqwest::Response, path: &Path) -> Result<u64> {
    let write_err = |e: std::io::Error| Error::Download(format!("Cannot write {}: {}", path.display(), e));

    let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut bytes = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::Download(format!("{}: {}", url, e)))?
    {
        file.write_all(&chunk).await.map_err(write_err)?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;
    Ok(bytes)
}
