//! Collects per-video fanout results into the run's database.

use super::{Database, VectorRecord, VideoRef};
use crate::embedding::FanoutOutcome;

/// What one video contributed to the run.
#[derive(Debug, Clone)]
pub enum VideoResult {
    /// Windows were embedded (possibly with some failures).
    Embedded {
        source: String,
        video: VideoRef,
        outcome: FanoutOutcome,
    },
    /// Download or transcription failed; the video contributes nothing.
    Failed { source: String, reason: String },
}

/// Per-video status line kept for the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoReport {
    /// URL as configured.
    pub source: String,
    pub video: Option<VideoRef>,
    pub status: VideoStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoStatus {
    Indexed {
        records: usize,
        failed_windows: usize,
        windows: usize,
    },
    Failed {
        reason: String,
    },
}

impl VideoReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, VideoStatus::Failed { .. })
    }
}

/// Accumulates records across the sequential video loop.
///
/// Records are appended in the order videos are pushed; the order of records
/// within one video is whatever order the fanout completed in.
#[derive(Debug, Default)]
pub struct RecordAggregator {
    records: Vec<VectorRecord>,
    reports: Vec<VideoReport>,
}

impl RecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one video's result and return its report.
    pub fn push(&mut self, result: VideoResult) -> &VideoReport {
        let report = match result {
            VideoResult::Embedded {
                source,
                video,
                outcome,
            } => {
                let status = VideoStatus::Indexed {
                    records: outcome.records.len(),
                    failed_windows: outcome.failed,
                    windows: outcome.total,
                };
                self.records.extend(outcome.records);
                VideoReport {
                    source,
                    video: Some(video),
                    status,
                }
            }
            VideoResult::Failed { source, reason } => VideoReport {
                source,
                video: None,
                status: VideoStatus::Failed { reason },
            },
        };

        self.reports.push(report);
        &self.reports[self.reports.len() - 1]
    }

    /// Records collected so far.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn reports(&self) -> &[VideoReport] {
        &self.reports
    }

    /// Hand over the accumulated records as the run's database.
    pub fn finalize(self) -> Database {
        Database::new(self.records)
    }
}

impl FromIterator<VideoResult> for RecordAggregator {
    fn from_iter<I: IntoIterator<Item = VideoResult>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        for result in iter {
            aggregator.push(result);
        }
        aggregator
    }
}

/// Concatenate the records of every video result, in order.
pub fn finalize(results: impl IntoIterator<Item = VideoResult>) -> Database {
    results.into_iter().collect::<RecordAggregator>().finalize()
}
