//! HTTP client wrapper for the manifest fetch and image downloads.
//!
//! Both call shapes go through one [`HttpClient`] so they share the fixed
//! browser User-Agent and the timeout configuration.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;

/// HTTP client for the IIIF service.
///
/// Created once per run and reused for the manifest and every page image,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use iiif_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let bytes = client
///     .download_to_path(
///         "https://ids.lib.harvard.edu/ids/iiif/12345/0,0,800,1200/800,/0/default.jpg",
///         Path::new("./12345-1-800x1200.jpg"),
///     )
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default timeouts (30s connect, 5min request).
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a GET and returns the response whatever its status.
    ///
    /// Status interpretation is left to the caller; the manifest fetch reports
    /// headers for non-200 answers, the image path treats them as errors.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Timeout`] or [`DownloadError::Network`] on
    /// transport failure.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response, DownloadError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_request(url, e))
    }

    /// Streams `url` into the file at `path`, returning the bytes written.
    ///
    /// The file is created (or truncated) only after the server answered with
    /// a success status. A partial file left by a failed stream is removed.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    #[must_use = "download result carries the number of bytes written"]
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, path).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
        }
        let bytes_written = stream_result?;

        info!(path = %path.display(), bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }

}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_request(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(BROWSER_USER_AGENT)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_rejects_malformed_url_without_touching_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("page.jpg");

        let result = HttpClient::new().download_to_path("not a url", &target).await;

        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_download_sends_browser_user_agent() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/iiif/1/0,0,10,10/10,/0/default.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("1-a-10x10.jpg");
        let url = format!("{}/iiif/1/0,0,10,10/10,/0/default.jpg", server.uri());
        let bytes = HttpClient::new()
            .download_to_path(&url, &target)
            .await
            .unwrap();

        assert_eq!(bytes, 4);
        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");

        // The UA contains commas, so compare the recorded header verbatim.
        let requests = server.received_requests().await.unwrap();
        let user_agent = requests[0]
            .headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok());
        assert_eq!(user_agent, Some(BROWSER_USER_AGENT));
    }

    #[tokio::test]
    async fn test_download_error_status_leaves_no_file() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("restricted.jpg");
        let url = format!("{}/iiif/2/full/full/0/default.jpg", server.uri());
        let err = HttpClient::new()
            .download_to_path(&url, &target)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::HttpStatus { status: 403, .. }));
        assert!(!target.exists());
    }
}
