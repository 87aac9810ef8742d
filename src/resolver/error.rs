//! Error types for manifest URL resolution.
//!
//! Messages follow the What/Why/Fix layout used across the project.

use thiserror::Error;

/// Errors that can occur while mapping an input URL to a manifest URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input matches neither the `ids:` nor the `drs:` shape, or the
    /// extracted identifier is not a usable number.
    #[error("invalid manifest url '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The input URL as given on the command line.
        input: String,
        /// Why no manifest could be derived.
        reason: String,
        /// How to fix the issue.
        suggestion: &'static str,
    },
}

impl ResolveError {
    /// Creates an invalid URL error with the standard suggestion.
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
            suggestion: "Pass a viewer or manifest URL containing `ids:<digits>` or \
                 `drs:<digits>`, e.g. https://iiif.lib.harvard.edu/manifests/view/drs:430576916",
        }
    }
}
