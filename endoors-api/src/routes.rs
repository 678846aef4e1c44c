//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/v1/config", get(handlers::get_config))

        // Names
        .route("/api/v1/names/:label/availability", get(handlers::check_availability))
        .route("/api/v1/names/:label/owner", get(handlers::get_owner))
        .route("/api/v1/names/register", post(handlers::register_name))

        // Full names
        .route("/api/v1/resolve/:name", get(handlers::resolve_name))
        .route("/api/v1/namehash/:name", get(handlers::get_namehash))

        // Reverse lookup
        .route("/api/v1/addresses/:address/name", get(handlers::reverse_resolve))

        .with_state(state)
}
