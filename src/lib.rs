//! vidsearch - spoken-word video to vector database
//!
//! Downloads the audio of a list of videos, transcribes it, slices the
//! transcript into overlapping time windows and embeds every window,
//! producing a flat JSON collection of searchable passages.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `audio_source` - Audio acquisition (yt-dlp metadata, download and cache)
//! - `transcription` - Speech-to-text and the segment store
//! - `chunking` - Sliding-window slicing of transcripts
//! - `embedding` - Embedding providers and the bounded-concurrency fanout
//! - `vector_store` - Record aggregation and persistence
//! - `orchestrator` - Sequential per-video pipeline
//! - `progress` - Progress observer hooks
//!
//! # Example
//!
//! ```rust,no_run
//! use vidsearch::config::Settings;
//! use vidsearch::orchestrator::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     settings.validate()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let summary = pipeline.run().await?;
//!     println!("{} records", summary.records);
//!
//!     Ok(())
//! }
//! ```

pub mod audio_source;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod progress;
pub mod transcription;
pub mod vector_store;

pub use error::{Result, VidsearchError};
