//! Request and response payloads for the HTTP API

use serde::{Deserialize, Serialize};

use crate::graph::{Fact, GraphInfo};
use crate::vector::{SearchHit, VectorStoreInfo};

/// One document submitted for ingestion
#[derive(Debug, Clone, Deserialize)]
pub struct DocItem {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// `POST /ingest` body
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    pub documents: Vec<DocItem>,
}

/// `POST /ingest` response
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub added_chunks: usize,
    pub triples_added: usize,
    pub vector_fragments: usize,
}

/// `POST /query` body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Fragment result limit; zero or negative skips vector search
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    #[serde(default = "default_hops")]
    pub hops: usize,
    #[serde(default = "default_use_generation")]
    pub use_generation: bool,
}

fn default_top_k() -> i64 {
    5
}
fn default_hops() -> usize {
    1
}
fn default_use_generation() -> bool {
    true
}

/// `POST /query` response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub entities: Vec<String>,
    pub graph: Vec<Fact>,
    pub retrieved: Vec<SearchHit>,
    pub answer: String,
}

/// `GET /health` response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub vector_info: VectorStoreInfo,
    pub graph_info: GraphInfo,
}

/// Error body returned by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
