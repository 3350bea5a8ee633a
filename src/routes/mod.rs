//! Route modules for the FOP Editor server and FOP sidecar

pub mod health;
pub mod render;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Public API: `/health` and `/api/render`
///
/// CORS is open so the editor frontend can call the API from its own origin.
pub fn api_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/render", render::method_router())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Sidecar API: `/health` and `/render`
pub fn sidecar_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/render", render::method_router())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
