//! # tessera-jsonapi - Schema-driven JSON:API resource listings
//!
//! This crate implements the "list resources" side of a [JSON:API](https://jsonapi.org)
//! server. Given a declarative resource schema and a data adapter, it
//! interprets the query parameters of a listing request, drives the adapter
//! through a fixed sequence of query-building phases and assembles a
//! paginated, linked compound document.
//!
//! ## Features
//!
//! - **Declarative schemas**: attributes, relationships, named filters and sort
//!   fields, pagination defaults and lifecycle listeners
//! - **Request-scoped permissions**: sortable and filterable flags may depend
//!   on the request
//! - **Compound documents**: `include` with nested paths, deduplicated
//!   `included` resources
//! - **Pagination links**: `first`, `prev`, `next` and `last` links with
//!   offset/limit pagination
//! - **Pluggable storage**: any [`Adapter`] implementation, with an in-memory
//!   reference adapter
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use tessera_jsonapi::{JsonApi, ListRequest};
//! use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryStore, Record};
//! use tessera_jsonapi::schema::{Attribute, Schema};
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert("people", Record::new("1").attribute("name", json!("Ada")));
//!
//! let schema = Schema::builder()
//!     .attribute(Attribute::new("name").sortable().filterable())
//!     .build()
//!     .unwrap();
//! let api = JsonApi::new("http://localhost:8080")
//!     .resource("people", MemoryAdapter::new(store, "people"), schema);
//!
//! let document = api
//!     .list("people", ListRequest::new("http://localhost:8080/people?sort=-name"))
//!     .unwrap();
//! assert_eq!(document.data.len(), 1);
//! assert_eq!(document.meta["total"], 1);
//! ```
//!
//! ## Query Parameters
//!
//! | Parameter | Example | Meaning |
//! |-----------|---------|---------|
//! | `sort` | `-created,title` | Sort keys, `-` for descending |
//! | `page[limit]` | `10` | Page size, capped by the schema limit |
//! | `page[offset]` | `20` | Results to skip |
//! | `filter[<name>]` | `filter[author]=1,2` | Filter by attribute, relationship or named filter |
//! | `include` | `author,comments.author` | Related resources to embed |

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod api;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod handlers;
pub mod include;
pub mod links;
pub mod params;
pub mod pipeline;
pub mod request;
pub mod routing;
pub mod schema;
pub mod serializer;
pub mod state;

// Re-export commonly used types
pub use adapter::{Adapter, AdapterError, AdapterResult, ResourceModel};
pub use api::{JsonApi, ResourceType};
pub use config::ServerConfig;
pub use document::{Document, JsonApiResponse, MEDIA_TYPE};
pub use error::{ApiError, ApiResult};
pub use request::ListRequest;
pub use schema::{Schema, SchemaBuilder, SchemaError};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application serving `api`.
///
/// Adds request tracing, a request timeout and, when enabled, CORS.
///
/// # Example
///
/// ```rust,ignore
/// use tessera_jsonapi::{JsonApi, ServerConfig, create_app};
///
/// let app = create_app(api, ServerConfig::default());
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// ```
pub fn create_app<A: Adapter>(api: JsonApi<A>, config: ServerConfig) -> Router {
    info!(
        resource_types = ?api.resource_types().collect::<Vec<_>>(),
        base_url = %api.base_url(),
        "Creating JSON:API server"
    );

    let state = AppState::new(Arc::new(api), config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer allowing `GET` from the configured origins.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tessera_jsonapi={},tessera={},tower_http=debug",
            level, level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
