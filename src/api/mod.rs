//! HTTP layer: request/response payloads, handlers, and the router

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use routes::build_router;
