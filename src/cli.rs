//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download every page image of a Harvard Library IIIF object.
///
/// Saves `manifest.json` and one full-resolution file per canvas into
/// `<identifier>-<label>` under the output directory.
#[derive(Parser, Debug)]
#[command(name = "iiif-downloader")]
#[command(author, version, about)]
#[command(after_help = "sample: https://iiif.lib.harvard.edu/manifests/view/drs:430576916$1i")]
pub struct Args {
    /// Viewer or manifest URL containing `ids:<digits>` or `drs:<digits>`
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Directory in which the object folder is created [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum download attempts per image for transient failures (0-10) [default: 3]
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: Option<u8>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
