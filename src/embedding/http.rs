//! HTTP embedding backend
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};

use super::Embedder;

/// Client for an OpenAI-compatible embeddings API
pub struct HttpEmbedder {
    client: Client,
    api_url: String,
    api_token: Option<String>,
    model: String,
    dim: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(
        api_url: String,
        api_token: Option<String>,
        model: String,
        dim: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(Self {
            client,
            api_url,
            api_token,
            model,
            dim,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), model = %self.model, "embedding batch");

        let mut request = self
            .client
            .post(&self.api_url)
            .json(&json!({ "model": self.model, "input": texts }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "embedding API error {status}: {body}"
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;
        if parsed.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "embedding API returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for row in parsed.data {
            if row.embedding.len() != self.dim {
                return Err(Error::Embedding(format!(
                    "embedding dimension {} does not match configured {}",
                    row.embedding.len(),
                    self.dim
                )));
            }
            vectors.push(row.embedding);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[1.0,0.0]},{"embedding":[0.0,1.0]}]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(
            server.url(),
            Some("token".to_string()),
            "test-model".to_string(),
            2,
            Duration::from_secs(5),
        )
        .unwrap();

        let vectors = embedder
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[1.0,0.0,0.0]}]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(
            server.url(),
            None,
            "test-model".to_string(),
            2,
            Duration::from_secs(5),
        )
        .unwrap();

        let result = embedder.embed(&["a".to_string()]).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(
            server.url(),
            None,
            "test-model".to_string(),
            2,
            Duration::from_secs(5),
        )
        .unwrap();

        let result = embedder.embed(&["a".to_string()]).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }
}
