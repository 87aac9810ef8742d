//! Maps viewer and manifest URLs to the canonical manifest endpoint.
//!
//! Two URL shapes are recognized, both carrying a numeric identifier:
//!
//! - `.../manifests/view/ids:2472900` (image delivery service objects)
//! - `.../manifests/view/drs:430576916$5i` (digital repository objects)
//!
//! The `ids:` shape is checked first; when an input contains both, the `ids:`
//! identifier wins. Anything after the digits (`$5i` page anchors, query
//! strings) is ignored.
//!
//! # Example
//!
//! ```
//! use iiif_core::resolver::{DEFAULT_MANIFEST_BASE, IdScheme, resolve};
//!
//! let manifest = resolve("https://iiif.lib.harvard.edu/manifests/view/drs:430576916$5i").unwrap();
//! assert_eq!(manifest.scheme(), IdScheme::Drs);
//! assert_eq!(manifest.identifier(), "430576916");
//! assert_eq!(
//!     manifest.manifest_url(DEFAULT_MANIFEST_BASE),
//!     "https://iiif.lib.harvard.edu/manifests/drs:430576916"
//! );
//! ```

mod error;

pub use error::ResolveError;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Manifest endpoint of the Harvard Library IIIF service.
pub const DEFAULT_MANIFEST_BASE: &str = "https://iiif.lib.harvard.edu/manifests/";

#[allow(clippy::expect_used)]
static IDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ids:(\d+)").expect("ids regex is valid"));

#[allow(clippy::expect_used)]
static DRS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"drs:(\d+)").expect("drs regex is valid"));

/// Identifier namespace of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// Image delivery service identifier.
    Ids,
    /// Digital repository service identifier.
    Drs,
}

impl IdScheme {
    /// Returns the URL prefix without the colon.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ids => "ids",
            Self::Drs => "drs",
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved manifest reference: scheme plus numeric identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRef {
    scheme: IdScheme,
    identifier: String,
}

impl ManifestRef {
    /// Returns the identifier namespace.
    #[must_use]
    pub fn scheme(&self) -> IdScheme {
        self.scheme
    }

    /// Returns the numeric identifier exactly as it appeared in the input.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Builds the manifest URL under `base` (a trailing `/` is optional).
    #[must_use]
    pub fn manifest_url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        format!("{base}/{}:{}", self.scheme, self.identifier)
    }
}

/// Resolves an input URL to a manifest reference.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidUrl`] when neither pattern is present, or
/// when the matched digits do not form a non-zero number.
#[tracing::instrument(level = "debug")]
pub fn resolve(input: &str) -> Result<ManifestRef, ResolveError> {
    let matched = [(IdScheme::Ids, &*IDS_PATTERN), (IdScheme::Drs, &*DRS_PATTERN)]
        .into_iter()
        .find_map(|(scheme, pattern)| {
            pattern
                .captures(input)
                .and_then(|caps| caps.get(1))
                .map(|digits| (scheme, digits.as_str()))
        });

    let Some((scheme, digits)) = matched else {
        return Err(ResolveError::invalid_url(
            input,
            "no `ids:<digits>` or `drs:<digits>` segment found",
        ));
    };

    if digits.trim_start_matches('0').is_empty() {
        return Err(ResolveError::invalid_url(
            input,
            format!("identifier `{digits}` is not a usable number"),
        ));
    }

    debug!(%scheme, identifier = digits, "resolved manifest identifier");
    Ok(ManifestRef {
        scheme,
        identifier: digits.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ids_viewer_url() {
        let manifest = resolve("https://iiif.lib.harvard.edu/manifests/view/ids:2472900").unwrap();
        assert_eq!(manifest.scheme(), IdScheme::Ids);
        assert_eq!(manifest.identifier(), "2472900");
        assert_eq!(
            manifest.manifest_url(DEFAULT_MANIFEST_BASE),
            "https://iiif.lib.harvard.edu/manifests/ids:2472900"
        );
    }

    #[test]
    fn test_resolve_drs_viewer_url_ignores_page_anchor() {
        let manifest =
            resolve("https://iiif.lib.harvard.edu/manifests/view/drs:430576916$5i").unwrap();
        assert_eq!(manifest.scheme(), IdScheme::Drs);
        assert_eq!(
            manifest.manifest_url(DEFAULT_MANIFEST_BASE),
            "https://iiif.lib.harvard.edu/manifests/drs:430576916"
        );
    }

    #[test]
    fn test_resolve_ids_wins_over_drs() {
        let manifest = resolve("https://host/view/drs:111?ref=ids:222").unwrap();
        assert_eq!(manifest.scheme(), IdScheme::Ids);
        assert_eq!(manifest.identifier(), "222");
    }

    #[test]
    fn test_resolve_ignores_surrounding_content() {
        for input in [
            "ids:42",
            "https://example.org/anything/ids:42/more?x=1",
            "mirador?manifest=ids:42#page",
        ] {
            let manifest = resolve(input).unwrap();
            assert_eq!(manifest.manifest_url("https://m/"), "https://m/ids:42", "{input}");
        }
    }

    #[test]
    fn test_resolve_manifest_url_itself() {
        let manifest = resolve("https://iiif.lib.harvard.edu/manifests/ids:2472900").unwrap();
        assert_eq!(
            manifest.manifest_url(DEFAULT_MANIFEST_BASE),
            "https://iiif.lib.harvard.edu/manifests/ids:2472900"
        );
    }

    #[test]
    fn test_resolve_rejects_url_without_pattern() {
        let err = resolve("https://iiif.lib.harvard.edu/manifests/view/").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUrl { .. }));
    }

    #[test]
    fn test_resolve_rejects_empty_digits() {
        assert!(resolve("https://host/view/ids:abc").is_err());
        assert!(resolve("https://host/view/drs:").is_err());
    }

    #[test]
    fn test_resolve_rejects_zero_identifier() {
        let err = resolve("https://host/view/drs:0000").unwrap_err();
        assert!(err.to_string().contains("0000"));
    }

    #[test]
    fn test_manifest_url_base_without_trailing_slash() {
        let manifest = resolve("drs:7").unwrap();
        assert_eq!(
            manifest.manifest_url("http://127.0.0.1:9000/manifests"),
            "http://127.0.0.1:9000/manifests/drs:7"
        );
    }
}
