//! Service entry point

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kgraph_rag::api::{build_router, AppState};
use kgraph_rag::config::Config;
use kgraph_rag::graph::GraphStore;
use kgraph_rag::llm::LlmClient;
use kgraph_rag::vector::VectorStore;
use kgraph_rag::{embedding, Error};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let data_dir = Path::new(&config.storage.data_dir);

    let embedder = embedding::from_config(&config.embedding)?;
    let vectors = VectorStore::open(data_dir, embedder)?;
    let graph = GraphStore::open(data_dir.join("graph.json"))?;

    // The key may legitimately be absent: extraction then degrades to empty
    // results and generation reports the configuration error in the answer.
    let api_key = match config.llm_api_key() {
        Ok(key) => Some(key),
        Err(Error::Config(msg)) => {
            tracing::warn!(%msg, "LLM disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };
    let llm = LlmClient::new(&config.llm, api_key)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        vectors: Arc::new(RwLock::new(vectors)),
        graph: Arc::new(RwLock::new(graph)),
        llm: Arc::new(llm),
        config: Arc::new(config),
    };
    let router = build_router(state);

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
