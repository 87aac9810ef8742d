//! Top-level error for a pipeline run.

use thiserror::Error;

use crate::download::BatchError;
use crate::manifest::{FetchError, ManifestError};
use crate::output::OutputError;
use crate::resolver::ResolveError;

/// Broad failure category of a run, used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input URL carries no usable manifest identifier.
    InvalidUrl,
    /// The manifest request was answered but not with a JSON document.
    FetchFailed,
    /// The manifest lacks fields the pipeline needs.
    InvalidManifest,
    /// Transport failure or error status on the wire.
    Network,
    /// Filesystem failure.
    Io,
}

/// Any failure that stops a run.
#[derive(Debug, Error)]
pub enum IiifError {
    /// See [`ResolveError`].
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// See [`FetchError`].
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// See [`ManifestError`].
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// See [`OutputError`].
    #[error(transparent)]
    Output(#[from] OutputError),

    /// See [`BatchError`].
    #[error(transparent)]
    Download(#[from] BatchError),
}

impl IiifError {
    /// Category of the failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolve(_) => ErrorKind::InvalidUrl,
            Self::Fetch(FetchError::Transport(_)) => ErrorKind::Network,
            Self::Fetch(_) => ErrorKind::FetchFailed,
            Self::Manifest(_) => ErrorKind::InvalidManifest,
            Self::Output(_) => ErrorKind::Io,
            Self::Download(batch) if batch.source.is_io() => ErrorKind::Io,
            Self::Download(_) => ErrorKind::Network,
        }
    }

    /// Number of images written before the failure.
    #[must_use]
    pub fn images_saved(&self) -> usize {
        match self {
            Self::Download(batch) => batch.completed,
            _ => 0,
        }
    }
}
