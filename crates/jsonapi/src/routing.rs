//! Route configuration.

use axum::{Router, routing::get};

use crate::adapter::Adapter;
use crate::handlers;
use crate::state::AppState;

/// Creates the API routes.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness check
/// - `GET /{type}` - List resources
pub fn create_routes<A: Adapter>(state: AppState<A>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler::<A>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/{resource_type}", get(handlers::index_handler::<A>))
        .with_state(state)
}
