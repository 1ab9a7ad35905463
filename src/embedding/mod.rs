//! Embedding backends
//!
//! The vector store is generic over an [`Embedder`]: the HTTP backend talks to
//! an OpenAI-compatible `/embeddings` endpoint, the hashing backend is a
//! deterministic offline fallback used when no endpoint is configured (and by
//! the test suite).

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::Result;

/// A fixed-dimension text embedding model
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector dimension, fixed for the life of the embedder
    fn dim(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build the embedder selected by the configuration.
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match &config.api_url {
        Some(url) => {
            let embedder = HttpEmbedder::new(
                url.clone(),
                config.api_token.clone(),
                config.model.clone(),
                config.dim,
                std::time::Duration::from_millis(config.timeout_ms),
            )?;
            Ok(Arc::new(embedder))
        }
        None => {
            tracing::info!(dim = config.dim, "no embedding endpoint configured, using hashing embedder");
            Ok(Arc::new(HashingEmbedder::new(config.dim)))
        }
    }
}
