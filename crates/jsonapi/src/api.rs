//! Resource type registry.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::adapter::Adapter;
use crate::document::Document;
use crate::error::{ApiError, ApiResult};
use crate::pipeline::Index;
use crate::request::ListRequest;
use crate::schema::Schema;

/// A named resource type with its adapter and schema.
#[derive(Debug)]
pub struct ResourceType<A: Adapter> {
    name: String,
    adapter: A,
    schema: Arc<Schema<A>>,
}

impl<A: Adapter> ResourceType<A> {
    /// Creates a resource type.
    pub fn new(name: impl Into<String>, adapter: A, schema: Schema<A>) -> Self {
        Self {
            name: name.into(),
            adapter,
            schema: Arc::new(schema),
        }
    }

    /// Returns the resource type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema<A> {
        &self.schema
    }
}

/// The set of resource types served under one base URL.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_jsonapi::JsonApi;
/// use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryStore};
/// use tessera_jsonapi::schema::{Attribute, Schema};
///
/// let store = Arc::new(MemoryStore::new());
/// let schema = Schema::builder()
///     .attribute(Attribute::new("name").sortable())
///     .build()
///     .unwrap();
///
/// let api = JsonApi::new("http://localhost:8080")
///     .resource("people", MemoryAdapter::new(store, "people"), schema);
///
/// assert!(api.resource_type("people").is_ok());
/// assert!(api.resource_type("widgets").is_err());
/// ```
#[derive(Debug)]
pub struct JsonApi<A: Adapter> {
    base_url: String,
    resources: IndexMap<String, ResourceType<A>>,
}

impl<A: Adapter> JsonApi<A> {
    /// Creates an empty registry. Trailing slashes are removed from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resources: IndexMap::new(),
        }
    }

    /// Registers a resource type, replacing any type of the same name.
    pub fn resource(mut self, name: impl Into<String>, adapter: A, schema: Schema<A>) -> Self {
        self.register(ResourceType::new(name, adapter, schema));
        self
    }

    /// Registers a prepared resource type.
    pub fn register(&mut self, resource: ResourceType<A>) {
        self.resources.insert(resource.name.clone(), resource);
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a registered resource type.
    pub fn resource_type(&self, name: &str) -> ApiResult<&ResourceType<A>> {
        self.resources
            .get(name)
            .ok_or_else(|| ApiError::ResourceTypeNotFound {
                resource_type: name.to_string(),
            })
    }

    /// Returns the names of all registered resource types.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Lists resources of a type.
    pub fn list(&self, resource_type: &str, request: ListRequest) -> ApiResult<Document> {
        let resource = self.resource_type(resource_type)?;
        Index::new(self, resource).handle(request)
    }
}
