//! CLI entry point for the IIIF downloader.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use iiif_core::download::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, READ_TIMEOUT_SECS};
use iiif_core::{
    DEFAULT_MANIFEST_BASE, HttpClient, IiifError, RetryPolicy, RunOptions, RunSummary, run,
};
use tracing::{debug, error, info};

mod cli;
mod config;
mod progress;
mod terminal;

use cli::Args;
use config::FileConfig;
use progress::ConsoleReporter;

/// Process outcome, mapped onto the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Partial,
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        ExitCode::from(outcome.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse before tracing so --help and usage errors print without logs.
    let args = Args::parse();

    match run_downloader(args).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run_downloader(args: Args) -> Result<ProcessExit> {
    let file_config = config::load_default_file_config()?.unwrap_or_default();
    let settings = Settings::merge(&args, &file_config);

    let dumb_terminal = terminal::is_dumb_terminal();
    let no_color = terminal::should_disable_color(
        args.no_color,
        terminal::no_color_env_requested(),
        dumb_terminal,
    );
    terminal::init_tracing(settings.log_level, no_color);
    debug!(?args, ?settings, "CLI arguments parsed");

    let client =
        HttpClient::with_timeouts(settings.connect_timeout_secs, settings.read_timeout_secs);
    let options = RunOptions {
        output_root: settings.output_root,
        manifest_base: settings.manifest_base,
        retry_policy: RetryPolicy::with_max_attempts(settings.max_attempts),
    };

    let show_bar =
        terminal::should_show_progress(io::stderr().is_terminal(), args.quiet, dumb_terminal);
    let mut reporter = ConsoleReporter::new(show_bar, args.quiet);
    let result = run(&args.url, &client, &options, &mut reporter).await;
    reporter.finish();

    Ok(report_outcome(&result))
}

fn report_outcome(result: &Result<RunSummary, IiifError>) -> ProcessExit {
    match result {
        Ok(summary) => {
            info!(
                images = summary.images.len(),
                dir = %summary.output_dir.display(),
                "download complete"
            );
            ProcessExit::Success
        }
        Err(err) => {
            error!(kind = ?err.kind(), "{err}");
            if let IiifError::Fetch(fetch) = err {
                for (name, value) in fetch.headers() {
                    error!(header = %name, "{value}");
                }
            }
            determine_exit_outcome(err.images_saved())
        }
    }
}

/// A failed run is partial when at least one image reached disk.
pub(crate) fn determine_exit_outcome(images_saved: usize) -> ProcessExit {
    if images_saved > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

/// Effective runtime settings after CLI and file merge.
#[derive(Debug)]
struct Settings {
    output_root: PathBuf,
    manifest_base: String,
    max_attempts: u32,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
    log_level: &'static str,
}

impl Settings {
    fn merge(args: &Args, file: &FileConfig) -> Self {
        let log_level = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => file.verbosity.map_or("info", config::VerbositySetting::log_level),
                1 => "debug",
                _ => "trace",
            }
        };

        Self {
            output_root: args
                .output_dir
                .clone()
                .or_else(|| file.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            manifest_base: file
                .manifest_base
                .clone()
                .unwrap_or_else(|| DEFAULT_MANIFEST_BASE.to_string()),
            max_attempts: args
                .max_retries
                .or(file.max_retries)
                .map_or(DEFAULT_MAX_RETRIES, u32::from),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            log_level,
        }
    }
}
