//! Data models for transcription.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// A single timestamped unit of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcribed text. May carry surrounding whitespace.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether the segment shares any time with the half-open range `[start, end)`.
    ///
    /// Both comparisons are strict: a segment that only touches a boundary
    /// does not overlap.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end > start
    }

    fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start <= self.end
    }
}

/// Read-only, ordered segments of one video's transcript.
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    /// Wrap transcription output, dropping malformed segments.
    ///
    /// Segment order is kept exactly as given.
    pub fn new(segments: Vec<Segment>) -> Self {
        let total = segments.len();
        let segments: Vec<Segment> = segments.into_iter().filter(Segment::is_well_formed).collect();

        if segments.len() < total {
            warn!(
                "Dropped {} malformed transcript segment(s)",
                total - segments.len()
            );
        }

        Self { segments }
    }

    /// Load a transcript file containing a JSON array of `{start, end, text}`.
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let segments: Vec<Segment> = serde_json::from_str(&content)?;
        Ok(Self::new(segments))
    }

    /// End of the last segment, or `None` for an empty store.
    pub fn total_duration(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<Segment>> for SegmentStore {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_total_duration() {
        let store = SegmentStore::new(vec![
            Segment::new(0.0, 5.0, "Hello world"),
            Segment::new(5.0, 10.0, "This is a test"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.total_duration(), Some(10.0));
    }

    #[test]
    fn test_empty_store_has_no_duration() {
        let store = SegmentStore::new(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.total_duration(), None);
    }

    #[test]
    fn test_malformed_segments_dropped() {
        let store = SegmentStore::new(vec![
            Segment::new(0.0, 5.0, "ok"),
            Segment::new(9.0, 3.0, "backwards"),
            Segment::new(f64::NAN, 12.0, "nan"),
            Segment::new(10.0, 12.0, "also ok"),
        ]);

        let texts: Vec<&str> = store.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["ok", "also ok"]);
    }

    #[test]
    fn test_overlap_is_strict() {
        let seg = Segment::new(10.0, 20.0, "a");
        assert!(seg.overlaps(0.0, 30.0));
        assert!(!seg.overlaps(20.0, 50.0));
        assert!(!seg.overlaps(0.0, 10.0));
    }

    #[test]
    fn test_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"start": 0.0, "end": 4.5, "text": " hi "}}, {{"start": 4.5, "end": 8.0, "text": "there"}}]"#
        )
        .unwrap();

        let store = SegmentStore::from_json(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.segments()[0].text, " hi ");
        assert_eq!(store.total_duration(), Some(8.0));
    }
}
