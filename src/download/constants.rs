//! Constants for the download module (timeouts, headers).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout (5 minutes for large page scans).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Browser User-Agent sent on every request.
///
/// The image server filters non-browser agents, so the manifest fetch and all
/// image downloads present this fixed string.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.114 Safari/537.36 Edg/89.0.774.75";

/// Bytes per reported megabyte.
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;
