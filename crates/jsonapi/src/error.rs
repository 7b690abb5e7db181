//! Error types for the JSON:API listing pipeline.
//!
//! Every error raised while interpreting parameters or driving the query
//! pipeline aborts the request and is rendered as a JSON:API error document.
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | `source.parameter` |
//! |-------|-------------|--------------------|
//! | InvalidParameter | 400 | offending parameter (`page[limit]`, `filter`, ...) |
//! | UnknownField | 400 | `sort` or `filter[<name>]` |
//! | InvalidInclude | 400 | `include` |
//! | BadRequest | 400 | optional |
//! | ResourceTypeNotFound | 404 | - |
//! | Adapter | 500 | - |

use std::fmt;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::adapter::AdapterError;
use crate::document::MEDIA_TYPE;

/// Which query parameter an unresolvable field name was used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUsage {
    /// The `sort` parameter.
    Sort,
    /// A `filter[<name>]` parameter.
    Filter,
}

impl fmt::Display for FieldUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldUsage::Sort => f.write_str("sort field"),
            FieldUsage::Filter => f.write_str("filter"),
        }
    }
}

/// The primary error type for listing requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A query parameter has the wrong shape or value.
    #[error("{message}")]
    InvalidParameter {
        /// Parameter path, e.g. `page[limit]`.
        parameter: String,
        /// Human-readable message.
        message: String,
    },

    /// A sort or filter name resolved to nothing in the schema.
    #[error("Invalid {usage} [{name}]")]
    UnknownField {
        /// The unresolvable name.
        name: String,
        /// Where the name was used.
        usage: FieldUsage,
    },

    /// An include path names something that is not an includable relationship.
    #[error("Invalid include [{path}]")]
    InvalidInclude {
        /// The dotted path up to and including the offending segment.
        path: String,
    },

    /// Generic client error raised by schema callbacks.
    #[error("{message}")]
    BadRequest {
        /// Human-readable message.
        message: String,
        /// Parameter the error is attributed to, if any.
        parameter: Option<String>,
    },

    /// No resource type is registered under the requested name.
    #[error("Resource type not found: {resource_type}")]
    ResourceTypeNotFound {
        /// The requested resource type.
        resource_type: String,
    },

    /// Data-store failure reported by the adapter.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ApiError {
    /// Creates an [`ApiError::InvalidParameter`].
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Creates an [`ApiError::UnknownField`] for the `sort` parameter.
    pub fn unknown_sort_field(name: impl Into<String>) -> Self {
        ApiError::UnknownField {
            name: name.into(),
            usage: FieldUsage::Sort,
        }
    }

    /// Creates an [`ApiError::UnknownField`] for a `filter[<name>]` parameter.
    pub fn unknown_filter(name: impl Into<String>) -> Self {
        ApiError::UnknownField {
            name: name.into(),
            usage: FieldUsage::Filter,
        }
    }

    /// Creates an [`ApiError::BadRequest`] attributed to a parameter.
    pub fn bad_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter { .. }
            | ApiError::UnknownField { .. }
            | ApiError::InvalidInclude { .. }
            | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceTypeNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Adapter(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the query parameter path this error is attributed to.
    pub fn source_parameter(&self) -> Option<String> {
        match self {
            ApiError::InvalidParameter { parameter, .. } => Some(parameter.clone()),
            ApiError::UnknownField {
                usage: FieldUsage::Sort,
                ..
            } => Some("sort".to_string()),
            ApiError::UnknownField {
                name,
                usage: FieldUsage::Filter,
            } => Some(format!("filter[{}]", name)),
            ApiError::InvalidInclude { .. } => Some("include".to_string()),
            ApiError::BadRequest { parameter, .. } => parameter.clone(),
            ApiError::ResourceTypeNotFound { .. } | ApiError::Adapter(_) => None,
        }
    }

    /// Converts the error into a JSON:API error object.
    pub fn to_error_object(&self) -> ErrorObject {
        let status = self.status();
        ErrorObject {
            status: status.as_str().to_string(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            detail: self.to_string(),
            source: self
                .source_parameter()
                .map(|parameter| ErrorSource { parameter }),
        }
    }
}

/// A single entry of a JSON:API `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    /// HTTP status code as a string.
    pub status: String,
    /// Short summary of the problem.
    pub title: String,
    /// Explanation specific to this occurrence.
    pub detail: String,
    /// Pointer to the offending request part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// The `source` member of an error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
    /// The query parameter that caused the error.
    pub parameter: String,
}

/// Builds a JSON:API error document for a list of errors.
pub fn error_document(errors: &[ErrorObject]) -> serde_json::Value {
    serde_json::json!({ "errors": errors })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Listing request failed");
        } else {
            tracing::debug!(error = %self, "Rejected listing request");
        }

        let body = error_document(&[self.to_error_object()]);
        let mut response = (status, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        response
    }
}

/// Result type alias for listing operations.
pub type ApiResult<T> = Result<T, ApiError>;
