//! Output directory naming and preparation.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::manifest::Manifest;

/// Maximum number of label characters kept in the directory name.
pub const LABEL_MAX_CHARS: usize = 64;

/// Name of the manifest copy written into the output directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Characters replaced by `-` in directory and file names.
const UNSAFE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', ' '];

/// Errors raised while preparing the output directory.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Directory creation failed.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing `manifest.json` failed.
    #[error("failed to write {path}: {source}")]
    WriteManifest {
        /// File path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be serialized.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Replaces each filesystem-unsafe character with `-`.
#[must_use]
pub fn replace_unsafe_chars(value: &str) -> String {
    value
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Truncates a label to [`LABEL_MAX_CHARS`] characters and replaces unsafe
/// characters. Applying it twice yields the same string.
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    let truncated: String = label.chars().take(LABEL_MAX_CHARS).collect();
    replace_unsafe_chars(&truncated)
}

/// Builds `<identifier>-<sanitized label>`; an absent label leaves the
/// suffix empty.
#[must_use]
pub fn output_dir_name(identifier: &str, label: Option<&str>) -> String {
    let suffix = label.map(sanitize_label).unwrap_or_default();
    format!("{identifier}-{suffix}")
}

/// Creates the output directory under `root` and writes `manifest.json`.
///
/// Existing directories are reused and an existing `manifest.json` is
/// overwritten.
///
/// # Errors
///
/// Returns [`OutputError`] when the directory or file cannot be written.
#[instrument(skip(manifest), fields(root = %root.display()))]
pub fn prepare_output_dir(
    root: &Path,
    identifier: &str,
    manifest: &Manifest,
) -> Result<PathBuf, OutputError> {
    let dir = root.join(output_dir_name(identifier, manifest.label()));

    std::fs::create_dir_all(&dir).map_err(|source| OutputError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    debug!(dir = %dir.display(), "output directory ready");

    let manifest_path = dir.join(MANIFEST_FILENAME);
    let json = manifest.to_pretty_json()?;
    std::fs::write(&manifest_path, json).map_err(|source| OutputError::WriteManifest {
        path: manifest_path.clone(),
        source,
    })?;
    info!(path = %manifest_path.display(), "manifest saved");

    Ok(dir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn manifest(label: Option<&str>) -> Manifest {
        let mut raw = json!({ "sequences": [{ "canvases": [] }] });
        if let Some(label) = label {
            raw["label"] = json!(label);
        }
        Manifest::from_value(raw).unwrap()
    }

    #[test]
    fn test_output_dir_name_replaces_space() {
        assert_eq!(output_dir_name("430576916", Some("Test Book")), "430576916-Test-Book");
    }

    #[test]
    fn test_output_dir_name_without_label() {
        assert_eq!(output_dir_name("2472900", None), "2472900-");
    }

    #[test]
    fn test_sanitize_label_replaces_every_unsafe_char() {
        assert_eq!(sanitize_label(r#"a\b/c:d*e?f"g<h>i|j k"#), "a-b-c-d-e-f-g-h-i-j-k");
    }

    #[test]
    fn test_sanitize_label_truncates_to_64_chars() {
        let long = "é".repeat(100);
        let sanitized = sanitize_label(&long);
        assert_eq!(sanitized.chars().count(), LABEL_MAX_CHARS);
    }

    #[test]
    fn test_sanitize_label_is_idempotent() {
        for label in [
            "Test Book",
            "",
            "Letters: from \"home\" / abroad?",
            "x y".repeat(40).as_str(),
        ] {
            let once = sanitize_label(label);
            assert_eq!(sanitize_label(&once), once, "{label}");
            assert!(once.chars().count() <= LABEL_MAX_CHARS);
        }
    }

    #[test]
    fn test_prepare_output_dir_writes_manifest() {
        let root = TempDir::new().unwrap();
        let manifest = manifest(Some("Test Book"));

        let dir = prepare_output_dir(root.path(), "430576916", &manifest).unwrap();

        assert_eq!(dir, root.path().join("430576916-Test-Book"));
        let written = std::fs::read_to_string(dir.join(MANIFEST_FILENAME)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(&parsed, manifest.raw());
    }

    #[test]
    fn test_prepare_output_dir_is_idempotent_and_overwrites() {
        let root = TempDir::new().unwrap();
        let dir = prepare_output_dir(root.path(), "1", &manifest(Some("A"))).unwrap();
        std::fs::write(dir.join(MANIFEST_FILENAME), "stale").unwrap();

        let again = prepare_output_dir(root.path(), "1", &manifest(Some("A"))).unwrap();

        assert_eq!(dir, again);
        let written = std::fs::read_to_string(again.join(MANIFEST_FILENAME)).unwrap();
        assert_ne!(written, "stale");
    }

    #[test]
    fn test_prepare_output_dir_creates_missing_parents() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        let dir = prepare_output_dir(&nested, "9", &manifest(None)).unwrap();
        assert!(dir.ends_with("9-"));
        assert!(dir.is_dir());
    }
}
