//! Configuration module for vidsearch.
//!
//! Handles loading, validating and saving application settings.

mod settings;

pub use settings::{
    EmbeddingProvider, EmbeddingSettings, GeneralSettings, Settings, SourceSettings,
    TranscriptionSettings, WindowingSettings, DEFAULT_OLLAMA_ENDPOINT,
};
