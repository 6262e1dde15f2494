//! Bounded-concurrency embedding of transcript windows.
//!
//! Every window is embedded independently. At most `concurrency_limit` calls
//! are in flight; a failed call drops its window and nothing else. Results
//! arrive in completion order, so each record is built from the window that
//! travelled with its own future.

use super::Embedder;
use crate::chunking::Window;
use crate::progress::ProgressObserver;
use crate::vector_store::{VectorRecord, VideoRef};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default number of embedding calls in flight.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Outcome of embedding one window.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedOutcome {
    Embedded(Vec<f64>),
    Failed(String),
}

/// Fanout tuning.
#[derive(Debug, Clone)]
pub struct FanoutOptions {
    /// Maximum concurrent embedder calls. Zero is treated as one.
    pub concurrency_limit: usize,
    /// Abandon a single call after this long.
    pub call_timeout: Option<Duration>,
}

impl Default for FanoutOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY,
            call_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl FanoutOptions {
    pub fn from_settings(settings: &crate::config::EmbeddingSettings) -> Self {
        Self {
            concurrency_limit: settings.concurrency,
            call_timeout: (settings.timeout_seconds > 0)
                .then(|| Duration::from_secs(settings.timeout_seconds)),
        }
    }
}

/// Records produced by one fanout plus failure accounting.
#[derive(Debug, Clone, Default)]
pub struct FanoutOutcome {
    /// One record per successfully embedded window, in completion order.
    pub records: Vec<VectorRecord>,
    /// Windows whose embedding failed.
    pub failed: usize,
    /// Windows submitted.
    pub total: usize,
}

async fn embed_one(embedder: &dyn Embedder, text: &str, timeout: Option<Duration>) -> EmbedOutcome {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, embedder.embed(text)).await {
            Ok(result) => result,
            Err(_) => return EmbedOutcome::Failed(format!("timed out after {:?}", limit)),
        },
        None => embedder.embed(text).await,
    };

    match result {
        Ok(vector) if !vector.is_empty() => EmbedOutcome::Embedded(vector),
        Ok(_) => EmbedOutcome::Failed("empty embedding".to_string()),
        Err(e) => EmbedOutcome::Failed(e.to_string()),
    }
}

/// Embed every window of one video with bounded concurrency.
#[instrument(skip_all, fields(video_id = %video.id, windows = windows.len()))]
pub async fn embed_all(
    video: &VideoRef,
    windows: Vec<Window>,
    embedder: &dyn Embedder,
    options: &FanoutOptions,
    observer: &dyn ProgressObserver,
) -> FanoutOutcome {
    let total = windows.len();
    let limit = options.concurrency_limit.max(1);
    let completed = AtomicUsize::new(0);

    observer.embedding_started(total);

    let results: Vec<(Window, EmbedOutcome)> = stream::iter(windows)
        .map(|window| {
            let completed = &completed;
            async move {
                let outcome = embed_one(embedder, &window.text, options.call_timeout).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                observer.embedding_progress(done, total);
                (window, outcome)
            }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    observer.embedding_finished();

    let mut outcome = FanoutOutcome {
        records: Vec::with_capacity(results.len()),
        failed: 0,
        total,
    };

    for (window, result) in results {
        match result {
            EmbedOutcome::Embedded(embedding) => {
                outcome.records.push(VectorRecord::new(video, window, embedding));
            }
            EmbedOutcome::Failed(reason) => {
                debug!("Dropping window at {:.1}s: {}", window.start, reason);
                outcome.failed += 1;
            }
        }
    }

    info!(
        "Embedded {}/{} windows with {} ({} failed)",
        outcome.records.len(),
        total,
        embedder.model(),
        outcome.failed
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, VidsearchError};
    use crate::progress::NoProgress;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn windows(n: usize) -> Vec<Window> {
        (0..n)
            .map(|i| Window {
                start: i as f64 * 15.0,
                end: i as f64 * 15.0 + 30.0,
                text: format!("window {}", i),
            })
            .collect()
    }

    fn video() -> VideoRef {
        VideoRef::new("vid1", "A Talk")
    }

    /// Fails for configured window texts; sleeps a little so calls overlap.
    struct FlakyEmbedder {
        fail: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FlakyEmbedder {
        fn new(fail: &[usize]) -> Self {
            Self {
                fail: fail.iter().map(|i| format!("window {}", i)).collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f64>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            // Later windows finish first to scramble completion order
            let index: u64 = text.trim_start_matches("window ").parse().unwrap();
            tokio::time::sleep(Duration::from_millis(5 + (20 - index.min(20)))).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(text) {
                Err(VidsearchError::Embedding("service unavailable".to_string()))
            } else {
                Ok(vec![index as f64, 1.0])
            }
        }

        fn model(&self) -> &str {
            "flaky"
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        progress: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressObserver for RecordingObserver {
        fn embedding_progress(&self, done: usize, total: usize) {
            self.progress.lock().unwrap().push((done, total));
        }
    }

    #[tokio::test]
    async fn test_failed_windows_dropped_others_attributed() {
        let embedder = FlakyEmbedder::new(&[3, 7]);
        let input = windows(10);

        let outcome = embed_all(&video(), input.clone(), &embedder, &FanoutOptions::default(), &NoProgress).await;

        assert_eq!(outcome.total, 10);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.records.len(), 8);

        for record in &outcome.records {
            let index = record.embedding[0] as usize;
            assert_ne!(index, 3);
            assert_ne!(index, 7);

            let source = &input[index];
            assert_eq!(record.text, source.text);
            assert_eq!(record.start_time, source.start);
            assert_eq!(record.end_time, source.end);
            assert_eq!(record.video_id, "vid1");
            assert_eq!(record.video_title, "A Talk");
        }
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let embedder = FlakyEmbedder::new(&[]);
        let options = FanoutOptions {
            concurrency_limit: 5,
            call_timeout: None,
        };

        let outcome = embed_all(&video(), windows(20), &embedder, &options, &NoProgress).await;

        assert_eq!(outcome.records.len(), 20);
        let peak = embedder.max_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 5, "observed {} concurrent calls", peak);
        assert!(peak > 1, "calls never overlapped");
    }

    #[tokio::test]
    async fn test_zero_limit_still_makes_progress() {
        let embedder = FlakyEmbedder::new(&[]);
        let options = FanoutOptions {
            concurrency_limit: 0,
            call_timeout: None,
        };

        let outcome = embed_all(&video(), windows(3), &embedder, &options, &NoProgress).await;
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(embedder.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_progress_reported_for_every_window() {
        let embedder = FlakyEmbedder::new(&[1]);
        let observer = RecordingObserver::default();

        embed_all(&video(), windows(6), &embedder, &FanoutOptions::default(), &observer).await;

        let progress = observer.progress.lock().unwrap();
        let done: Vec<usize> = progress.iter().map(|(d, _)| *d).collect();
        assert_eq!(done, vec![1, 2, 3, 4, 5, 6]);
        assert!(progress.iter().all(|(_, t)| *t == 6));
    }

    #[tokio::test]
    async fn test_empty_window_list() {
        let embedder = FlakyEmbedder::new(&[]);
        let outcome = embed_all(&video(), Vec::new(), &embedder, &FanoutOptions::default(), &NoProgress).await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.total, 0);
    }

    struct HangingEmbedder;

    #[async_trait]
    impl Embedder for HangingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f64>> {
            if text == "window 1" {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(vec![0.25])
        }

        fn model(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_hung_call_times_out_without_affecting_others() {
        let options = FanoutOptions {
            concurrency_limit: 5,
            call_timeout: Some(Duration::from_millis(100)),
        };

        let outcome = embed_all(&video(), windows(4), &HangingEmbedder, &options, &NoProgress).await;

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.records.iter().all(|r| r.text != "window 1"));
    }

    #[tokio::test]
    async fn test_empty_vector_counts_as_failure() {
        struct EmptyEmbedder;

        #[async_trait]
        impl Embedder for EmptyEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
                Ok(Vec::new())
            }

            fn model(&self) -> &str {
                "empty"
            }
        }

        let outcome = embed_one(&EmptyEmbedder, "text", None).await;
        assert_eq!(outcome, EmbedOutcome::Failed("empty embedding".to_string()));
    }
}
