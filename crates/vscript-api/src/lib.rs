//! Axum HTTP API server.
//!
//! This crate provides:
//! - The `/api/generate` endpoint backed by the generation pipeline
//! - HS256 session token resolution with first-class anonymous callers
//! - Request-id, logging and security-header middleware
//! - Error translation from the pipeline taxonomy to HTTP responses

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
