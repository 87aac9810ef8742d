//! Manifest retrieval over HTTP.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::download::{DownloadError, HttpClient};

/// Errors raised by [`fetch_manifest`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service answered with something other than `200 OK`.
    #[error("manifest fetch failed: HTTP {status} from {url}")]
    Status {
        /// Manifest URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response headers, in arrival order.
        headers: Vec<(String, String)>,
    },

    /// The body is not a JSON object.
    #[error("manifest fetch failed: body from {url} is not a JSON object ({reason})")]
    NotJson {
        /// Manifest URL.
        url: String,
        /// Parser message or the JSON type received.
        reason: String,
    },

    /// Transport failure (DNS, connect, reset, timeout).
    #[error(transparent)]
    Transport(#[from] DownloadError),
}

impl FetchError {
    /// Response headers captured for a non-200 answer.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        match self {
            Self::Status { headers, .. } => headers,
            _ => &[],
        }
    }
}

/// Fetches and parses the manifest document at `url`.
///
/// # Errors
///
/// Returns [`FetchError::Status`] for a non-200 status,
/// [`FetchError::NotJson`] when the body is not a JSON object, and
/// [`FetchError::Transport`] for network failures.
#[instrument(skip(client), fields(url = %url))]
pub async fn fetch_manifest(client: &HttpClient, url: &str) -> Result<Value, FetchError> {
    let response = client.get(url).await?;
    let status = response.status();

    if status != reqwest::StatusCode::OK {
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        warn!(status = status.as_u16(), "manifest request rejected");
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            headers,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DownloadError::from_request(url, e))?;
    debug!(bytes = body.len(), "manifest body received");

    let document: Value = serde_json::from_slice(&body).map_err(|e| FetchError::NotJson {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !document.is_object() {
        return Err(FetchError::NotJson {
            url: url.to_string(),
            reason: format!("got {}", json_type_name(&document)),
        });
    }

    info!(label = ?document.get("label"), "manifest fetched");
    Ok(document)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_exposes_headers() {
        let error = FetchError::Status {
            url: "https://iiif.lib.harvard.edu/manifests/drs:1".to_string(),
            status: 404,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
        };
        assert_eq!(error.headers().len(), 1);
        assert!(error.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_not_json_has_no_headers() {
        let error = FetchError::NotJson {
            url: "u".to_string(),
            reason: "got an array".to_string(),
        };
        assert!(error.headers().is_empty());
        assert!(error.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&Value::Null), "null");
        assert_eq!(json_type_name(&serde_json::json!([1])), "an array");
    }
}
