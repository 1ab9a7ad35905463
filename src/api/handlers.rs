//! API handlers
//!
//! The stores are injected components shared through [`AppState`]; each lives
//! behind an async `RwLock`, which provides the external write serialization
//! the stores themselves do not (they are single-writer by design).

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::graph::GraphStore;
use crate::llm::{extract_entities, extract_triples, generate_answer, LlmClient};
use crate::metrics::METRICS;
use crate::retrieval::fuse;
use crate::vector::{FragmentRecord, VectorStore};

use super::models::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub vectors: Arc<RwLock<VectorStore>>,
    pub graph: Arc<RwLock<GraphStore>>,
    pub llm: Arc<LlmClient>,
    pub config: Arc<Config>,
}

type HandlerError = (StatusCode, Json<ApiError>);

fn internal_error(e: impl std::fmt::Display) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("INTERNAL_ERROR", e.to_string())),
    )
}

/// Service health plus store counts
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let vector_info = state.vectors.read().await.info();
    let graph_info = state.graph.read().await.info();
    Json(HealthResponse {
        status: "ok".to_string(),
        vector_info,
        graph_info,
    })
}

/// Prometheus metrics
///
/// GET /metrics
pub async fn metrics() -> String {
    METRICS.render()
}

/// Ingest documents: chunk, extract triples, persist to both stores
///
/// POST /ingest
pub async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, HandlerError> {
    let timer = METRICS
        .request_duration
        .with_label_values(&["ingest"])
        .start_timer();
    info!(documents = request.documents.len(), "ingest request");

    let mut records = Vec::new();
    let mut triples_added = 0usize;

    for doc in &request.documents {
        let doc_id = doc
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let source = doc.source.clone().unwrap_or_else(|| doc_id.clone());

        for (i, chunk) in chunk_text(&doc.text).into_iter().enumerate() {
            let chunk_id = format!("{doc_id}::chunk::{i}");

            // extraction failures degrade to an empty list, never an error
            let candidates = extract_triples(&state.llm, &chunk).await;
            for fact in candidates {
                let mut graph = state.graph.write().await;
                graph
                    .add_triple(&fact.sub, &fact.rel, &fact.obj, Some(&doc_id))
                    .map_err(|e| {
                        METRICS.ingest_requests.with_label_values(&["error"]).inc();
                        error!(error = %e, "triple persistence failed");
                        internal_error(e)
                    })?;
                triples_added += 1;
            }

            records.push(FragmentRecord {
                doc_id: doc_id.clone(),
                chunk_id,
                text: chunk,
                source: Some(source.clone()),
            });
        }
    }

    let added_chunks = records.len();
    {
        let mut vectors = state.vectors.write().await;
        vectors.add(records).await.map_err(|e| {
            METRICS.ingest_requests.with_label_values(&["error"]).inc();
            error!(error = %e, "fragment persistence failed");
            internal_error(e)
        })?;
    }

    let vector_fragments = state.vectors.read().await.info().fragments;
    METRICS.ingest_requests.with_label_values(&["ok"]).inc();
    METRICS.fragments_added.inc_by(added_chunks as f64);
    METRICS.triples_added.inc_by(triples_added as f64);
    timer.observe_duration();

    Ok(Json(IngestResponse {
        added_chunks,
        triples_added,
        vector_fragments,
    }))
}

/// Answer a question: extract entities, fuse both retrieval signals,
/// optionally generate
///
/// POST /query
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HandlerError> {
    let timer = METRICS
        .request_duration
        .with_label_values(&["query"])
        .start_timer();
    info!(question = %request.question, hops = request.hops, "query request");

    // extraction failures degrade to an empty entity list
    let entities = extract_entities(&state.llm, &request.question).await;

    let fused = {
        let graph = state.graph.read().await;
        let vectors = state.vectors.read().await;
        fuse(
            &graph,
            &vectors,
            entities,
            &request.question,
            request.hops,
            request.top_k,
        )
        .await
        .map_err(|e| {
            METRICS.query_requests.with_label_values(&["error"]).inc();
            error!(error = %e, "retrieval failed");
            internal_error(e)
        })?
    };

    let answer = if request.use_generation {
        // generation failures surface as a descriptive answer string
        match generate_answer(&state.llm, &fused.context, &request.question).await {
            Ok(answer) => answer,
            Err(e) => format!("Generation failed: {e}"),
        }
    } else {
        "Generation disabled.".to_string()
    };

    METRICS.query_requests.with_label_values(&["ok"]).inc();
    timer.observe_duration();

    Ok(Json(QueryResponse {
        question: request.question,
        entities: fused.entities,
        graph: fused.facts,
        retrieved: fused.fragments,
        answer,
    }))
}
