//! Listing handler.
//!
//! `GET [base]/[type]?params` runs the listing pipeline for a registered
//! resource type and returns a JSON:API document.

use axum::{
    extract::{OriginalUri, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::adapter::Adapter;
use crate::document::JsonApiResponse;
use crate::error::ApiResult;
use crate::request::ListRequest;
use crate::state::AppState;

/// Handler for listing resources of a type.
///
/// # Response
///
/// - `200 OK` - Listing document
/// - `400 Bad Request` - Invalid query parameter
/// - `404 Not Found` - Unknown resource type
/// - `500 Internal Server Error` - Adapter failure
pub async fn index_handler<A: Adapter>(
    State(state): State<AppState<A>>,
    Path(resource_type): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    debug!(
        resource_type = %resource_type,
        query = uri.query().unwrap_or_default(),
        "Processing listing request"
    );

    let request = ListRequest::from_origin(state.api().base_url(), &uri).with_headers(headers);
    let document = state.api().list(&resource_type, request)?;

    Ok(JsonApiResponse(document).into_response())
}
