//! Model bundle download and cache
//!
//! Each bundle is fetched at most once: if the cache file exists it is used
//! as-is, otherwise it is streamed from its URL into `<file>.part` and renamed
//! into place once complete.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use birdcast_common::config::{ModelSource, Settings};
use birdcast_common::model::{load_bundle, Bundle};

use crate::Models;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Progress is logged at every this-many percent
const PROGRESS_STEP: u64 = 10;

/// Model store error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("No cached {name} bundle at {} and no download URL configured", .path.display())]
    Missing { name: &'static str, path: PathBuf },

    #[error(transparent)]
    Bundle(#[from] birdcast_common::Error),
}

/// Client used for bundle downloads
pub fn http_client() -> Result<reqwest::Client, StoreError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("birdcast-api/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Return the local path of a bundle, downloading it first if absent
pub async fn ensure_cached(
    client: &reqwest::Client,
    source: &ModelSource,
) -> Result<PathBuf, StoreError> {
    if source.path.exists() {
        info!("Using cached {} bundle at {}", source.name, source.path.display());
        return Ok(source.path.clone());
    }

    let url = source.url.as_deref().ok_or_else(|| StoreError::Missing {
        name: source.name,
        path: source.path.clone(),
    })?;

    if let Some(parent) = source.path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part = part_path(&source.path);
    match download(client, url, &part).await {
        Ok(bytes) => {
            tokio::fs::rename(&part, &source.path).await?;
            info!(
                "Downloaded {} bundle ({} bytes) to {}",
                source.name,
                bytes,
                source.path.display()
            );
            Ok(source.path.clone())
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                debug!("No partial file to remove at {}: {}", part.display(), cleanup);
            }
            Err(e)
        }
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Stream `url` into `dest`, returning the byte count
async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64, StoreError> {
    info!("Downloading model bundle from {}", url);
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total = response.content_length().filter(|t| *t > 0);
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;
    let mut next_report = PROGRESS_STEP;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        match total {
            Some(total) => {
                let percent = downloaded * 100 / total;
                if percent >= next_report {
                    info!(
                        "Download progress: {}% ({}/{} bytes)",
                        percent.min(100),
                        downloaded,
                        total
                    );
                    next_report = (percent / PROGRESS_STEP + 1) * PROGRESS_STEP;
                }
            }
            None => debug!("Downloaded {} bytes", downloaded),
        }
    }

    file.flush().await?;
    if let Some(total) = total {
        if downloaded != total {
            warn!("Expected {} bytes but received {}", total, downloaded);
        }
    }
    Ok(downloaded)
}

async fn fetch<B: Bundle>(client: &reqwest::Client, source: &ModelSource) -> Result<B, StoreError> {
    let path = ensure_cached(client, source).await?;
    Ok(load_bundle::<B>(&path)?)
}

/// Make sure all three bundles are cached, then load and validate them
pub async fn load_models(settings: &Settings) -> Result<Models, StoreError> {
    let client = http_client()?;
    Ok(Models {
        presence: fetch(&client, &settings.presence).await?,
        location: fetch(&client, &settings.location).await?,
        best_time: fetch(&client, &settings.best_time).await?,
    })
}
