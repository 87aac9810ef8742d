//! Sequential image downloader with retry support.
//!
//! Targets are fetched strictly one after another: the Nth request is only
//! issued once the (N-1)th file is fully written and its size read back.
//! The first image that still fails after its retry budget stops the batch;
//! files already written stay on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::size::format_megabytes;
use super::{DownloadError, HttpClient};
use crate::plan::DownloadTarget;

/// A page image written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    /// File name inside the output directory.
    pub filename: String,
    /// Full path of the written file.
    pub path: PathBuf,
    /// Size read back from the filesystem after the write.
    pub bytes: u64,
}

impl DownloadedImage {
    /// Size in megabytes, three significant figures.
    #[must_use]
    pub fn megabytes(&self) -> String {
        format_megabytes(self.bytes)
    }
}

/// The image that stopped a batch.
#[derive(Debug, Error)]
#[error("failed to download {filename} after {attempts} attempt(s): {source}")]
pub struct BatchError {
    /// File name of the failing target.
    pub filename: String,
    /// Attempts made for the failing target.
    pub attempts: u32,
    /// Images written before the failure.
    pub completed: usize,
    /// The last error seen for the failing target.
    #[source]
    pub source: DownloadError,
}

/// Downloads targets one at a time into a directory.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: HttpClient,
    retry_policy: RetryPolicy,
}

impl ImageDownloader {
    /// Creates a downloader sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: HttpClient, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    /// Downloads every target in order, calling `on_complete` after each file.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] for the first target that could not be written.
    #[instrument(skip_all, fields(total = targets.len(), dir = %output_dir.display()))]
    pub async fn download_all<F>(
        &self,
        targets: &[DownloadTarget],
        output_dir: &Path,
        mut on_complete: F,
    ) -> Result<Vec<DownloadedImage>, BatchError>
    where
        F: FnMut(usize, &DownloadedImage),
    {
        let mut completed = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            let path = output_dir.join(&target.filename);
            let image = self
                .download_one(target, &path)
                .await
                .map_err(|(source, attempts)| BatchError {
                    filename: target.filename.clone(),
                    attempts,
                    completed: completed.len(),
                    source,
                })?;
            on_complete(index, &image);
            completed.push(image);
        }

        info!(downloaded = completed.len(), "all images downloaded");
        Ok(completed)
    }

    async fn download_one(
        &self,
        target: &DownloadTarget,
        path: &Path,
    ) -> Result<DownloadedImage, (DownloadError, u32)> {
        let attempts = download_with_retry(&self.client, &target.url, path, &self.retry_policy)
            .await?;

        let bytes = tokio::fs::metadata(path)
            .await
            .map_err(|e| (DownloadError::io(path, e), attempts))?
            .len();

        let image = DownloadedImage {
            filename: target.filename.clone(),
            path: path.to_path_buf(),
            bytes,
        };
        info!(
            filename = %image.filename,
            size_mb = %image.megabytes(),
            attempts,
            "image saved"
        );
        Ok(image)
    }
}

/// Downloads one URL with retry logic, returning the attempt count on success.
///
/// # Returns
///
/// - `Ok(u32)` - Attempts used
/// - `Err((DownloadError, u32))` - Last error and total attempt count
#[instrument(skip(client, policy), fields(url = %url))]
async fn download_with_retry(
    client: &HttpClient,
    url: &str,
    path: &Path,
    policy: &RetryPolicy,
) -> Result<u32, (DownloadError, u32)> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "attempting download");

        match client.download_to_path(url, path).await {
            Ok(_) => return Ok(attempt),
            Err(e) => match policy.should_retry(classify_error(&e), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    warn!(
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "retrying download"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%reason, "not retrying download");
                    return Err((e, attempt));
                }
            },
        }
    }
}
