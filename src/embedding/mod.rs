//! Embedding generation and the bounded-concurrency fanout over windows.

pub mod fanout;
mod ollama;
mod openai;

pub use fanout::{embed_all, EmbedOutcome, FanoutOptions, FanoutOutcome};
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Build the embedder selected in settings.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let timeout = (settings.timeout_seconds > 0).then(|| Duration::from_secs(settings.timeout_seconds));

    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            settings.ollama_endpoint(),
            &settings.model,
            timeout,
        )?),
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.openai_api_base(),
            timeout,
        )?),
    };

    Ok(embedder)
}
