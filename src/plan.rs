//! Derives download targets (full-resolution URL + local filename) from canvases.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::iiif::{ImageApiUrl, literal_full_resolution};
use crate::manifest::Canvas;

#[allow(clippy::expect_used)]
static SUB_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iiif/(\d+)").expect("sub-id regex is valid"));

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Placeholder used when a thumbnail id has no `iiif/<digits>` segment.
pub const UNKNOWN_SUB_ID: &str = "unknown";

/// One image to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Full-resolution image URL.
    pub url: String,
    /// File name inside the output directory.
    pub filename: String,
}

/// Maps every canvas to a target, preserving manifest order.
#[must_use]
pub fn derive_targets(canvases: &[Canvas]) -> Vec<DownloadTarget> {
    canvases.iter().map(derive_target).collect()
}

/// Maps one canvas to its target.
///
/// Filename: `<subId>-<seq>-<width>x<height><suffix>`.
#[must_use]
pub fn derive_target(canvas: &Canvas) -> DownloadTarget {
    let thumbnail_id = canvas.thumbnail.id.as_str();
    let sub_id = sub_id(thumbnail_id).unwrap_or(UNKNOWN_SUB_ID);
    let seq = sequence_label(&canvas.label);
    let suffix = suffix(thumbnail_id);
    let filename = format!("{sub_id}-{seq}-{}x{}{suffix}", canvas.width, canvas.height);

    let url = full_resolution_url(thumbnail_id, canvas.width, canvas.height);
    debug!(%url, %filename, "derived download target");

    DownloadTarget { url, filename }
}

/// Rewrites a thumbnail URL to request the whole image at full width.
#[must_use]
pub fn full_resolution_url(thumbnail_id: &str, width: u32, height: u32) -> String {
    match ImageApiUrl::parse(thumbnail_id) {
        Ok(parsed) => parsed.full_resolution(width, height).to_string(),
        Err(error) => {
            warn!(
                thumbnail = thumbnail_id,
                %error,
                "thumbnail is not an Image API URL, falling back to literal rewrite"
            );
            literal_full_resolution(thumbnail_id, width, height)
        }
    }
}

fn sub_id(thumbnail_id: &str) -> Option<&str> {
    SUB_ID_PATTERN
        .captures(thumbnail_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whitespace runs become `-`. Path separators are replaced too so a label
/// like `1/2` cannot escape the output directory.
fn sequence_label(label: &str) -> String {
    WHITESPACE_RUN
        .replace_all(label, "-")
        .replace(['/', '\\'], "-")
}

/// Extension including the dot, taken from the last path segment only.
fn suffix(thumbnail_id: &str) -> &str {
    let last_segment_start = thumbnail_id.rfind('/').map_or(0, |i| i + 1);
    thumbnail_id[last_segment_start..]
        .rfind('.')
        .map_or("", |dot| &thumbnail_id[last_segment_start + dot..])
}
