//! IIIF Downloader Core Library
//!
//! Fetches a Harvard Library IIIF manifest, derives a full-resolution URL
//! for every canvas, and saves the manifest plus all page images into one
//! directory per object.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`resolver`] - Viewer/manifest URL to manifest endpoint mapping
//! - [`manifest`] - Manifest fetch and the fields the pipeline reads
//! - [`output`] - Output directory naming and `manifest.json`
//! - [`iiif`] - Structured IIIF Image API URLs
//! - [`plan`] - Canvas to download target derivation
//! - [`download`] - HTTP client, streaming, retry, sequential downloader
//! - [`pipeline`] - The end-to-end run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod error;
pub mod iiif;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod resolver;

// Re-export commonly used types
pub use download::{DownloadError, DownloadedImage, HttpClient, RetryPolicy};
pub use error::{ErrorKind, IiifError};
pub use manifest::{Canvas, Manifest};
pub use pipeline::{RunObserver, RunOptions, RunSummary, run};
pub use plan::{DownloadTarget, derive_targets};
pub use resolver::{DEFAULT_MANIFEST_BASE, ManifestRef, resolve};
