//! Progress hooks for the ingestion pipeline.
//!
//! Observers are purely informational: nothing they do can change what the
//! pipeline produces.

use crate::vector_store::VideoReport;

/// Receives progress notifications. Every method defaults to a no-op.
pub trait ProgressObserver: Send + Sync {
    /// A video is about to be fetched. `index` is zero-based.
    fn video_started(&self, _index: usize, _total: usize, _source: &str) {}

    /// A video finished, successfully or not.
    fn video_finished(&self, _report: &VideoReport) {}

    /// An embedding fanout over `total` windows is starting.
    fn embedding_started(&self, _total: usize) {}

    /// `done` of `total` embedding calls have completed.
    fn embedding_progress(&self, _done: usize, _total: usize) {}

    /// The embedding fanout finished.
    fn embedding_finished(&self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
