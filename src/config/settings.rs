//! Configuration settings for vidsearch.

use crate::error::{Result, VidsearchError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub sources: SourceSettings,
    pub transcription: TranscriptionSettings,
    pub embedding: EmbeddingSettings,
    pub windowing: WindowingSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where downloaded audio is cached, keyed by video id.
    pub downloads_dir: String,
    /// Output path of the vector database.
    pub db_path: String,
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            downloads_dir: "./downloads".to_string(),
            db_path: "./db.json".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// The videos to ingest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceSettings {
    /// Video URLs (or bare YouTube ids), processed in order.
    pub videos: Vec<String>,
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model name.
    pub model: String,
    /// Base URL of an OpenAI-compatible server. `None` uses api.openai.com.
    pub api_base: Option<String>,
    /// Language hint passed to the model.
    pub language: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            api_base: None,
            language: None,
        }
    }
}

/// Embedding provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Ollama `/api/embeddings`.
    #[default]
    Ollama,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(EmbeddingProvider::Ollama),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Ollama => write!(f, "ollama"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Ollama's embeddings URL on a local install.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/embeddings";

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (ollama, openai).
    pub provider: EmbeddingProvider,
    /// For Ollama the full `/api/embeddings` URL (unset means the local
    /// default). For OpenAI the base URL of a compatible server (unset means
    /// api.openai.com).
    pub endpoint: Option<String>,
    /// Embedding model to use.
    pub model: String,
    /// Maximum embedding calls in flight per video.
    pub concurrency: usize,
    /// Per-call timeout in seconds; 0 disables it.
    pub timeout_seconds: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            endpoint: None,
            model: "bge-m3".to_string(),
            concurrency: 5,
            timeout_seconds: 60,
        }
    }
}

impl EmbeddingSettings {
    /// URL the Ollama embedder posts to.
    pub fn ollama_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT)
    }

    /// API base for the OpenAI provider; `None` is the hosted API.
    pub fn openai_api_base(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Whether embedding calls go to api.openai.com and need a key.
    pub fn uses_hosted_openai(&self) -> bool {
        self.provider == EmbeddingProvider::OpenAI && self.openai_api_base().is_none()
    }

    /// Where embedding requests are sent, for display.
    pub fn target(&self) -> &str {
        match self.provider {
            EmbeddingProvider::Ollama => self.ollama_endpoint(),
            EmbeddingProvider::OpenAI => self.openai_api_base().unwrap_or("https://api.openai.com/v1"),
        }
    }

    /// Check the endpoint against the selected provider.
    pub fn validate_endpoint(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            if endpoint.trim().is_empty() {
                return Err(VidsearchError::Config(
                    "embedding.endpoint is empty; remove it to use the provider default".to_string(),
                ));
            }
        }

        let target = self.target();
        let url = url::Url::parse(target).map_err(|e| {
            VidsearchError::Config(format!("Invalid embedding.endpoint '{}': {}", target, e))
        })?;

        // async-openai appends `/embeddings` to the base
        if self.provider == EmbeddingProvider::OpenAI
            && url.path().trim_end_matches('/').ends_with("/api/embeddings")
        {
            return Err(VidsearchError::Config(format!(
                "embedding.endpoint '{}' is an Ollama embeddings URL; provider \"openai\" needs an \
                 OpenAI-compatible base such as http://localhost:11434/v1",
                target
            )));
        }

        Ok(())
    }
}

/// Sliding window parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowingSettings {
    /// Window length in seconds.
    pub window_seconds: f64,
    /// Distance between consecutive window starts in seconds.
    pub step_seconds: f64,
}

impl Default for WindowingSettings {
    fn default() -> Self {
        Self {
            window_seconds: 30.0,
            step_seconds: 15.0,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else if path.is_some() {
            Err(VidsearchError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| VidsearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidsearch")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded downloads directory path.
    pub fn downloads_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.downloads_dir)
    }

    /// Get the expanded database path.
    pub fn db_path(&self) -> PathBuf {
        Self::expand_path(&self.general.db_path)
    }

    /// Check that everything the pipeline needs is present before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.sources.videos.is_empty() {
            return Err(VidsearchError::Config(
                "No videos configured. Add URLs to [sources].videos or pass them on the command line."
                    .to_string(),
            ));
        }

        for video in &self.sources.videos {
            if video.trim().is_empty() {
                return Err(VidsearchError::Config("Empty entry in [sources].videos".to_string()));
            }
        }

        if self.embedding.model.trim().is_empty() {
            return Err(VidsearchError::Config("embedding.model must be set".to_string()));
        }

        self.embedding.validate_endpoint()?;

        let WindowingSettings {
            window_seconds,
            step_seconds,
        } = self.windowing;
        if !(window_seconds.is_finite() && window_seconds > 0.0) {
            return Err(VidsearchError::Config(format!(
                "windowing.window_seconds must be positive, got {}",
                window_seconds
            )));
        }
        if !(step_seconds.is_finite() && step_seconds > 0.0) {
            return Err(VidsearchError::Config(format!(
                "windowing.step_seconds must be positive, got {}",
                step_seconds
            )));
        }

        Ok(())
    }
}
