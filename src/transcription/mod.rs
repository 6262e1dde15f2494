//! Transcription module for vidsearch.
//!
//! Speech-to-text via Whisper and the ordered segment store the windowing
//! stage consumes.

mod models;
mod whisper;

pub use models::{Segment, SegmentStore};
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into segments ordered by start time.
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>>;
}
