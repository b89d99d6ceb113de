//! Relay in front of an Ollama server, plus an in-memory telemetry collector.

pub mod collector;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod reshape;
pub mod state;
pub mod store;
pub mod upstream;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub use config::Args;
pub use state::AppState;

// creating the router with routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/generate", post(handlers::generate_handler))
        .route("/api/models", get(handlers::list_models_handler))
        .route("/api/models/download", post(handlers::download_model_handler))
        .route("/receive_data", post(handlers::receive_data_handler))
        .route("/get_data", get(handlers::get_data_handler))
        .route("/clear_data", post(handlers::clear_data_handler))
        .fallback(handlers::not_found_handler)
        .with_state(state)
}
