//! Health check handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::adapter::Adapter;
use crate::state::AppState;

/// Reports the server as healthy along with the served resource types.
///
/// `GET [base]/health`
pub async fn health_handler<A: Adapter>(State(state): State<AppState<A>>) -> Response {
    let resource_types: Vec<&str> = state.api().resource_types().collect();
    let body = serde_json::json!({
        "status": "healthy",
        "resource_types": resource_types,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Liveness check.
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
