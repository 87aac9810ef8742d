//! Console reporting for a run: progress bar plus one line per saved image.

use std::path::Path;

use iiif_core::{DownloadTarget, DownloadedImage, RunObserver};
use indicatif::{ProgressBar, ProgressStyle};

/// Reports run progress on the terminal.
///
/// Saved images are printed to stdout as `<filename>  ==>  <size> MB`. The
/// object label, the target directory and the bar go to stderr.
pub(crate) struct ConsoleReporter {
    show_bar: bool,
    quiet: bool,
    bar: ProgressBar,
    targets: Vec<String>,
}

impl ConsoleReporter {
    pub(crate) fn new(show_bar: bool, quiet: bool) -> Self {
        Self {
            show_bar,
            quiet,
            bar: ProgressBar::hidden(),
            targets: Vec::new(),
        }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Header shown before the downloads start, one line each.
fn run_header(label: Option<&str>, output_dir: &Path, images: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if let Some(label) = label {
        lines.push(label.to_string());
    }
    lines.push(format!("{images} image(s) ==> {}", output_dir.display()));
    lines
}

impl RunObserver for ConsoleReporter {
    fn targets_ready(
        &mut self,
        label: Option<&str>,
        output_dir: &Path,
        targets: &[DownloadTarget],
    ) {
        if !self.quiet {
            for line in run_header(label, output_dir, targets.len()) {
                eprintln!("{line}");
            }
        }

        self.targets = targets.iter().map(|t| t.filename.clone()).collect();
        if let Some(first) = self.targets.first()
            && self.show_bar
        {
            let bar = ProgressBar::new(targets.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message(first.clone());
            self.bar = bar;
        }
    }

    fn image_saved(&mut self, index: usize, image: &DownloadedImage) {
        self.bar.suspend(|| {
            println!("{}  ==>  {} MB", image.filename, image.megabytes());
        });
        self.bar.inc(1);
        if let Some(next) = self.targets.get(index + 1) {
            self.bar.set_message(next.clone());
        }
    }
}
