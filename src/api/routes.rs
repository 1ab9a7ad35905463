//! Router assembly and the API-key gate

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{self, AppState};
use super::models::ApiError;

const API_KEY_HEADER: &str = "x-api-key";

/// Build the service router.
///
/// `/ingest` and `/query` sit behind the API-key gate when one is configured;
/// `/health` and `/metrics` are always open.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/ingest", post(handlers::ingest))
        .route("/query", post(handlers::query))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject requests missing the configured `x-api-key` header.
async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    if state.config.auth.require_api_key {
        let presented = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        let expected = state.config.auth.api_key.as_deref();
        if expected.is_none() || presented != expected {
            warn!("rejected request with missing or invalid API key");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiError::new("UNAUTHORIZED", "Invalid API key")),
            ));
        }
    }
    Ok(next.run(request).await)
}
