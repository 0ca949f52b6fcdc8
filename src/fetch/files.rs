// src/fetch/files.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::{fs, path::Path, time::Duration};
use tokio::{fs as tokio_fs, time::sleep};
use tracing::{debug, error, info, warn};
use url::Url;

async fn download_core(client: &Client, url: &Url, dest: &Path) -> Result<u64> {
    debug!(%url, "GET");
    let bytes = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .bytes()
        .await
        .with_context(|| format!("Reading body from {}", url))?;

    if let Some(parent) = dest.parent() {
        tokio_fs::create_dir_all(parent).await?;
    }
    tokio_fs::write(dest, &bytes)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;
    Ok(bytes.len() as u64)
}

/// Longest pause between two attempts at the same file.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Delay before retry number `attempt` (1-based): `initial_ms * 2^(attempt-1)`,
/// capped at [`MAX_BACKOFF`].
pub fn backoff_delay(initial_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    let ms = initial_ms.saturating_mul(factor);
    Duration::from_millis(ms).min(MAX_BACKOFF)
}

/// Download `url` to `dest`, retrying up to `max_retries` times with
/// exponential backoff. Returns the number of bytes written.
pub async fn download_file(
    client: &Client,
    url: &Url,
    dest: &Path,
    max_retries: u32,
    initial_backoff_ms: u64,
) -> Result<u64> {
    let mut attempts = 0;
    loop {
        match download_core(client, url, dest).await {
            Ok(n) => {
                info!(%url, file = %dest.display(), bytes = n, "downloaded");
                return Ok(n);
            }
            Err(e) if attempts < max_retries => {
                attempts += 1;
                let backoff = backoff_delay(initial_backoff_ms, attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff.as_millis() as u64, error = %e, "Retrying");
                sleep(backoff).await;
            }
            Err(e) => {
                error!(%url, error = %e, "download failed");
                return Err(e);
            }
        }
    }
}

/// Remove every `.csv` directly inside `dir` so stale seasons never mix with
/// a fresh fetch. Creates `dir` if it does not exist yet.
pub fn delete_raw_files(dir: &Path) -> Result<usize> {
    info!("Deleting previously fetched files in {}", dir.display());
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        // same rule as the directory reader's `*.csv` glob: lowercase only
        let is_csv = path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv");
        if is_csv {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        }
    }
    debug!(removed, "raw files deleted");
    Ok(removed)
}
