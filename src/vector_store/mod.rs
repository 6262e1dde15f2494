//! Vector records, their aggregation across a run and persistence.

mod aggregator;
mod database;

pub use aggregator::{finalize, RecordAggregator, VideoReport, VideoResult, VideoStatus};
pub use database::{Database, PersistOutcome};

use crate::chunking::Window;
use serde::{Deserialize, Serialize};

/// Identity of the video records are attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
}

impl VideoRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One embedded window, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub video_id: String,
    pub video_title: String,
    /// Window start in seconds.
    pub start_time: f64,
    /// Window end in seconds.
    pub end_time: f64,
    pub text: String,
    pub embedding: Vec<f64>,
}

impl VectorRecord {
    /// Attribute an embedded window to its video.
    pub fn new(video: &VideoRef, window: Window, embedding: Vec<f64>) -> Self {
        Self {
            video_id: video.id.clone(),
            video_title: video.title.clone(),
            start_time: window.start,
            end_time: window.end,
            text: window.text,
            embedding,
        }
    }
}
