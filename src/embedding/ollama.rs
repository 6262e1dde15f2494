//! Ollama embeddings over HTTP.

use super::Embedder;
use crate::error::{Result, VidsearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Embedder for Ollama's `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create a client for `endpoint` (the full `/api/embeddings` URL).
    pub fn new(endpoint: &str, model: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| VidsearchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Option<Vec<f64>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(VidsearchError::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        match parsed.embedding {
            Some(embedding) if !embedding.is_empty() => Ok(embedding),
            _ => Err(VidsearchError::Embedding(
                "Response did not contain an embedding".to_string(),
            )),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral port and return its embeddings URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/embeddings", addr)
    }

    #[tokio::test]
    async fn test_embed_success() {
        let router = Router::new().route(
            "/api/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "bge-m3");
                let len = body["prompt"].as_str().unwrap().len() as f64;
                Json(json!({ "embedding": [len, 0.5, -1.0] }))
            }),
        );
        let url = serve(router).await;

        let embedder = OllamaEmbedder::new(&url, "bge-m3", Some(Duration::from_secs(5))).unwrap();
        let embedding = embedder.embed("four").await.unwrap();
        assert_eq!(embedding, vec![4.0, 0.5, -1.0]);
    }

    #[tokio::test]
    async fn test_embed_non_success_status() {
        let router = Router::new().route(
            "/api/embeddings",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let url = serve(router).await;

        let embedder = OllamaEmbedder::new(&url, "bge-m3", None).unwrap();
        let err = embedder.embed("text").await.unwrap_err();
        assert!(matches!(err, VidsearchError::Embedding(ref msg) if msg.contains("model not loaded")));
    }

    #[tokio::test]
    async fn test_embed_missing_vector_field() {
        let router = Router::new().route(
            "/api/embeddings",
            post(|| async { Json(json!({ "error": "oops" })) }),
        );
        let url = serve(router).await;

        let embedder = OllamaEmbedder::new(&url, "bge-m3", None).unwrap();
        assert!(matches!(
            embedder.embed("text").await,
            Err(VidsearchError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_connection_refused() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9/api/embeddings", "bge-m3", None).unwrap();
        assert!(matches!(embedder.embed("text").await, Err(VidsearchError::Http(_))));
    }
}
