//! CLI output formatting utilities.

use crate::progress::ProgressObserver;
use crate::vector_store::{VideoReport, VideoStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }
}

/// Prints per-video status lines and an embedding progress bar.
#[derive(Default)]
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for ProgressReporter {
    fn video_started(&self, index: usize, total: usize, source: &str) {
        Output::info(&format!("[{}/{}] Processing: {}", index + 1, total, source));
    }

    fn video_finished(&self, report: &VideoReport) {
        let title = report
            .video
            .as_ref()
            .map(|v| v.title.as_str())
            .unwrap_or(report.source.as_str());

        match &report.status {
            VideoStatus::Indexed {
                records,
                failed_windows,
                windows,
            } => {
                if *failed_windows > 0 {
                    Output::warning(&format!(
                        "  Finished '{}' ({}/{} windows embedded, {} failed)",
                        title, records, windows, failed_windows
                    ));
                } else {
                    Output::success(&format!("  Finished '{}' ({} windows)", title, records));
                }
            }
            VideoStatus::Failed { reason } => {
                Output::error(&format!("  Failed: {}", reason));
            }
        }
    }

    fn embedding_started(&self, total: usize) {
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(Output::progress_bar(total as u64, "vec"));
        }
    }

    fn embedding_progress(&self, done: usize, _total: usize) {
        if let Ok(bar) = self.bar.lock() {
            if let Some(pb) = bar.as_ref() {
                pb.set_position(done as u64);
            }
        }
    }

    fn embedding_finished(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        }
    }
}
