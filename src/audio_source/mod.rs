//! Audio acquisition for vidsearch.
//!
//! Resolves a video URL to a local audio file plus the title and stable id
//! used to attribute records.

mod ffmpeg;
mod youtube;

pub use ffmpeg::split_audio;
pub use youtube::{extract_video_id, YtDlpFetcher};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A downloaded (or cached) audio file for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedMedia {
    /// Local audio file.
    pub local_path: PathBuf,
    /// Display title.
    pub title: String,
    /// Stable identifier, also the cache key.
    pub id: String,
}

/// Trait for audio acquisition.
///
/// Implementations should be idempotent: fetching an id that is already
/// cached locally returns the cached file without downloading again.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the audio for a video URL.
    async fn fetch(&self, url: &str) -> Result<FetchedMedia>;
}
