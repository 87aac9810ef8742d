//! HTTP download engine for the manifest and page images.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large page scans)
//! - Fixed browser User-Agent on every request
//! - Configurable timeouts (30s connect, 5min request by default)
//! - Bounded retry with exponential backoff for transient failures
//! - Structured error types with full context

mod client;
mod constants;
mod engine;
mod error;
mod retry;
mod size;

pub use client::HttpClient;
pub use constants::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use engine::{BatchError, DownloadedImage, ImageDownloader};
pub use error::DownloadError;
pub use retry::{DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error};
pub use size::format_megabytes;
