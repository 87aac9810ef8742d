//! One invocation: resolve, fetch, prepare, derive, download.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::download::{DownloadedImage, HttpClient, ImageDownloader, RetryPolicy};
use crate::error::IiifError;
use crate::manifest::{Manifest, fetch_manifest};
use crate::output::prepare_output_dir;
use crate::plan::{DownloadTarget, derive_targets};
use crate::resolver::{DEFAULT_MANIFEST_BASE, resolve};

/// Progress callbacks for a run. Every method has a no-op default.
pub trait RunObserver {
    /// The manifest URL was resolved.
    fn manifest_resolved(&mut self, _manifest_url: &str) {}

    /// The manifest was fetched and the output directory is ready.
    fn targets_ready(
        &mut self,
        _label: Option<&str>,
        _output_dir: &Path,
        _targets: &[DownloadTarget],
    ) {
    }

    /// An image was written; `index` is its position in the target list.
    fn image_saved(&mut self, _index: usize, _image: &DownloadedImage) {}
}

impl RunObserver for () {}

/// Settings for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory under which `<id>-<label>` is created.
    pub output_root: PathBuf,
    /// Manifest endpoint base URL.
    pub manifest_base: String,
    /// Per-image retry policy.
    pub retry_policy: RetryPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            manifest_base: DEFAULT_MANIFEST_BASE.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Numeric manifest identifier.
    pub identifier: String,
    /// Directory holding `manifest.json` and the images.
    pub output_dir: PathBuf,
    /// Images written, in manifest order.
    pub images: Vec<DownloadedImage>,
}

/// Runs the full pipeline for `input_url`.
///
/// Nothing touches the network before the URL resolves, and nothing touches
/// the filesystem before the manifest has been fetched and validated.
///
/// # Errors
///
/// Returns [`IiifError`] for the first step that fails; images already
/// written stay on disk.
#[instrument(skip_all, fields(input = %input_url))]
pub async fn run<O: RunObserver>(
    input_url: &str,
    client: &HttpClient,
    options: &RunOptions,
    observer: &mut O,
) -> Result<RunSummary, IiifError> {
    let manifest_ref = resolve(input_url)?;
    let manifest_url = manifest_ref.manifest_url(&options.manifest_base);
    info!(manifest = %manifest_url, "resolved manifest");
    observer.manifest_resolved(&manifest_url);

    let document = fetch_manifest(client, &manifest_url).await?;
    let manifest = Manifest::from_value(document)?;

    let output_dir =
        prepare_output_dir(&options.output_root, manifest_ref.identifier(), &manifest)?;
    let targets = derive_targets(manifest.canvases());
    info!(
        label = manifest.label().unwrap_or_default(),
        images = targets.len(),
        dir = %output_dir.display(),
        "starting image downloads"
    );
    observer.targets_ready(manifest.label(), &output_dir, &targets);

    let downloader = ImageDownloader::new(client.clone(), options.retry_policy.clone());
    let images = downloader
        .download_all(&targets, &output_dir, |index, image| {
            observer.image_saved(index, image);
        })
        .await?;

    Ok(RunSummary {
        identifier: manifest_ref.identifier().to_string(),
        output_dir,
        images,
    })
}
