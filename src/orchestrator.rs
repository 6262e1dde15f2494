//! Pipeline orchestrator for vidsearch.
//!
//! Runs every configured video through fetch, transcription, windowing and
//! embedding, one video at a time, then persists the collected records once.

use crate::audio_source::{MediaFetcher, YtDlpFetcher};
use crate::chunking::{window, WindowConfig};
use crate::config::Settings;
use crate::embedding::{create_embedder, embed_all, Embedder, FanoutOptions};
use crate::error::Result;
use crate::progress::{NoProgress, ProgressObserver};
use crate::transcription::{SegmentStore, Transcriber, WhisperTranscriber};
use crate::vector_store::{
    Database, PersistOutcome, RecordAggregator, VideoRef, VideoReport, VideoResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The ingestion pipeline.
pub struct Pipeline {
    videos: Vec<String>,
    db_path: PathBuf,
    window_config: WindowConfig,
    fanout: FanoutOptions,
    fetcher: Arc<dyn MediaFetcher>,
    transcriber: Arc<dyn Transcriber>,
    embedder: Arc<dyn Embedder>,
    observer: Arc<dyn ProgressObserver>,
}

impl Pipeline {
    /// Build the production pipeline from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let fetcher: Arc<dyn MediaFetcher> = Arc::new(YtDlpFetcher::new(settings.downloads_dir()));
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(WhisperTranscriber::from_settings(&settings.transcription)?);
        let embedder = create_embedder(&settings.embedding)?;

        info!(
            "Embedding with {} ({}) at {}",
            settings.embedding.model,
            settings.embedding.provider,
            settings.embedding.target()
        );

        Self::with_components(settings, fetcher, transcriber, embedder)
    }

    /// Create a pipeline with custom collaborators.
    pub fn with_components(
        settings: Settings,
        fetcher: Arc<dyn MediaFetcher>,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let window_config = WindowConfig::try_from(&settings.windowing)?;
        let fanout = FanoutOptions::from_settings(&settings.embedding);
        let db_path = settings.db_path();

        Ok(Self {
            videos: settings.sources.videos,
            db_path,
            window_config,
            fanout,
            fetcher,
            transcriber,
            embedder,
            observer: Arc::new(NoProgress),
        })
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Fetch, transcribe, window and embed a single video.
    #[instrument(skip(self))]
    async fn process_video(&self, url: &str) -> Result<VideoResult> {
        let media = self.fetcher.fetch(url).await?;
        let video = VideoRef::new(media.id, media.title);

        info!("Transcribing '{}'", video.title);
        let segments = self.transcriber.transcribe(&media.local_path).await?;
        let store = SegmentStore::new(segments);
        info!("Transcription complete ({} segments)", store.len());

        let windows = window(&store, self.window_config.window_size, self.window_config.step_size)?;
        drop(store);
        info!("Embedding {} windows for '{}'", windows.len(), video.title);

        let outcome = embed_all(
            &video,
            windows,
            self.embedder.as_ref(),
            &self.fanout,
            self.observer.as_ref(),
        )
        .await;

        Ok(VideoResult::Embedded {
            source: url.to_string(),
            video,
            outcome,
        })
    }

    /// Process every configured video in order.
    ///
    /// A video that fails to download or transcribe is reported and skipped;
    /// the remaining videos are still processed.
    pub async fn collect(&self) -> RecordAggregator {
        let mut aggregator = RecordAggregator::new();
        let total = self.videos.len();

        for (index, url) in self.videos.iter().enumerate() {
            self.observer.video_started(index, total, url);

            let result = match self.process_video(url).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    VideoResult::Failed {
                        source: url.clone(),
                        reason: e.to_string(),
                    }
                }
            };

            let report = aggregator.push(result);
            self.observer.video_finished(report);
        }

        aggregator
    }

    /// Run the whole pipeline and persist the result.
    pub async fn run(&self) -> Result<RunSummary> {
        info!("Starting ingestion for {} videos", self.videos.len());

        let aggregator = self.collect().await;
        let reports = aggregator.reports().to_vec();
        let database = aggregator.finalize();
        let records = database.len();

        let outcome = database.persist(&self.db_path)?;
        if outcome == PersistOutcome::Empty {
            warn!("No records were produced; nothing persisted");
        }

        Ok(RunSummary {
            reports,
            records,
            outcome,
        })
    }

    /// Run without persisting, returning the database.
    pub async fn build(&self) -> (Database, Vec<VideoReport>) {
        let aggregator = self.collect().await;
        let reports = aggregator.reports().to_vec();
        (aggregator.finalize(), reports)
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    /// One entry per configured video, in order.
    pub reports: Vec<VideoReport>,
    /// Records in the database.
    pub records: usize,
    /// Whether anything was written.
    pub outcome: PersistOutcome,
}

impl RunSummary {
    pub fn failed_videos(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failed()).count()
    }
}
