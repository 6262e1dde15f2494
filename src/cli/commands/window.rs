//! Window command implementation.

use crate::chunking::window;
use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use crate::transcription::SegmentStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Print the windows of a transcript file as JSON.
pub fn run_window(
    transcript: &str,
    window_seconds: Option<f64>,
    step_seconds: Option<f64>,
    settings: &Settings,
) -> Result<()> {
    preflight::check(Operation::Window, settings)?;

    let store = SegmentStore::from_json(Path::new(transcript))
        .with_context(|| format!("Failed to read transcript {}", transcript))?;

    let windows = window(
        &store,
        window_seconds.unwrap_or(settings.windowing.window_seconds),
        step_seconds.unwrap_or(settings.windowing.step_seconds),
    )?;

    println!("{}", serde_json::to_string_pretty(&windows)?);
    Ok(())
}
