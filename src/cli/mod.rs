//! CLI module for vidsearch.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{Output, ProgressReporter};

use clap::{Parser, Subcommand};

/// vidsearch - turn spoken-word videos into a searchable vector database
///
/// Downloads audio, transcribes it, slices the transcript into overlapping
/// windows and embeds each window.
#[derive(Parser, Debug)]
#[command(name = "vidsearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDSEARCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, transcribe, window and embed every configured video
    Ingest {
        /// Additional video URLs, processed after the configured ones
        urls: Vec<String>,

        /// Output database path (overrides general.db_path)
        #[arg(long)]
        db: Option<String>,

        /// Maximum concurrent embedding calls (overrides embedding.concurrency)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Only use the URLs given on the command line
        #[arg(long)]
        only: bool,
    },

    /// Print the windows of a transcript file (JSON array of {start, end, text})
    Window {
        /// Transcript file
        transcript: String,

        /// Window length in seconds (defaults to windowing.window_seconds)
        #[arg(long)]
        window: Option<f64>,

        /// Step between window starts in seconds (defaults to windowing.step_seconds)
        #[arg(long)]
        step: Option<f64>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,
}
