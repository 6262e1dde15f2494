//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{Result, VidsearchError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Embedder for the OpenAI embeddings API or a compatible server.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedder {
    /// Create an embedder for `model`, optionally against a compatible server.
    pub fn with_config(model: &str, api_base: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Ok(Self {
            client: create_client(api_base, timeout)?,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()
            .map_err(|e| VidsearchError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| VidsearchError::OpenAI(format!("Embedding API error: {}", e)))?;

        let embedding: Vec<f64> = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding.into_iter().map(f64::from).collect())
            .unwrap_or_default();

        if embedding.is_empty() {
            return Err(VidsearchError::Embedding("Empty embedding response".to_string()));
        }

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingProvider, EmbeddingSettings};
    use crate::embedding::create_embedder;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve `router` on an ephemeral port and return its `/v1` base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    #[tokio::test]
    async fn test_openai_provider_posts_to_compatible_base() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "nomic-embed-text");
                Json(json!({
                    "object": "list",
                    "model": "nomic-embed-text",
                    "data": [{ "object": "embedding", "index": 0, "embedding": [0.5, -0.25] }],
                    "usage": { "prompt_tokens": 2, "total_tokens": 2 }
                }))
            }),
        );
        let base = serve(router).await;

        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::OpenAI,
            endpoint: Some(base),
            model: "nomic-embed-text".to_string(),
            ..EmbeddingSettings::default()
        };
        let embedder = create_embedder(&settings).unwrap();

        assert_eq!(embedder.embed("hello").await.unwrap(), vec![0.5, -0.25]);
        assert_eq!(embedder.model(), "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_rate_limited_call_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/v1/embeddings",
                post(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({
                            "error": {
                                "message": "Rate limit reached",
                                "type": "requests",
                                "param": null,
                                "code": "rate_limit_exceeded"
                            }
                        })),
                    )
                }),
            )
            .with_state(hits.clone());
        let base = serve(router).await;

        let embedder =
            OpenAIEmbedder::with_config("text-embedding-3-small", Some(&base), Some(Duration::from_secs(5)))
                .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(4), embedder.embed("text"))
            .await
            .expect("rate-limited call should fail without backing off");

        assert!(matches!(result, Err(VidsearchError::OpenAI(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
