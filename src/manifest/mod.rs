//! IIIF Presentation manifest model.
//!
//! The manifest is kept as the raw JSON document (written verbatim to disk)
//! alongside the few fields the pipeline reads: the display `label` and the
//! canvases of the first sequence.

mod fetch;

pub use fetch::{FetchError, fetch_manifest};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised when an expected manifest field is missing or mistyped.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A required field is absent.
    #[error("manifest is missing `{field}`")]
    MissingField {
        /// JSON path of the missing field.
        field: &'static str,
    },

    /// A canvas lacks one of `thumbnail.@id`, `label`, `width`, `height`.
    #[error("canvas #{index} is malformed: {source}")]
    InvalidCanvas {
        /// Zero-based position in `sequences[0].canvases`.
        index: usize,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Thumbnail reference of a canvas.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    /// IIIF Image API URL of the thumbnail.
    #[serde(rename = "@id")]
    pub id: String,
}

/// One page of the digitized object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Canvas {
    /// Thumbnail reference, the source of the full-resolution URL.
    pub thumbnail: Thumbnail,
    /// Page label, e.g. `"(seq. 5)"`.
    pub label: String,
    /// Declared pixel width.
    pub width: u32,
    /// Declared pixel height.
    pub height: u32,
}

/// A fetched manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    raw: Value,
    label: Option<String>,
    canvases: Vec<Canvas>,
}

impl Manifest {
    /// Extracts the consumed fields from a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when `sequences[0].canvases` is absent or a
    /// canvas is missing one of its expected fields.
    pub fn from_value(raw: Value) -> Result<Self, ManifestError> {
        let canvases = raw
            .get("sequences")
            .ok_or(ManifestError::MissingField { field: "sequences" })?
            .get(0)
            .ok_or(ManifestError::MissingField {
                field: "sequences[0]",
            })?
            .get("canvases")
            .and_then(Value::as_array)
            .ok_or(ManifestError::MissingField {
                field: "sequences[0].canvases",
            })?
            .iter()
            .enumerate()
            .map(|(index, canvas)| {
                Canvas::deserialize(canvas)
                    .map_err(|source| ManifestError::InvalidCanvas { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let label = raw.get("label").and_then(display_label);

        Ok(Self {
            raw,
            label,
            canvases,
        })
    }

    /// Display label, if the manifest carries one.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Canvases of the first sequence, in manifest order.
    #[must_use]
    pub fn canvases(&self) -> &[Canvas] {
        &self.canvases
    }

    /// The document exactly as received.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Pretty-printed JSON (two-space indent, key order preserved).
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.raw)
    }
}

/// Presentation 2 labels are either a plain string or a list of strings /
/// `{"@value": ...}` language entries; the first string wins.
fn display_label(value: &Value) -> Option<String> {
    match value {
        Value::String(label) => Some(label.clone()),
        Value::Array(entries) => entries.iter().find_map(|entry| match entry {
            Value::String(label) => Some(label.clone()),
            Value::Object(map) => map.get("@value").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }),
        _ => None,
    }
}
