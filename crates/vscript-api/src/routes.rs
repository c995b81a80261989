//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{generate::generate, health, ready};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/generate", post(generate));

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .with_state(state)
}
