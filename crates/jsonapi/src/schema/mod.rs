//! Resource schema descriptors.
//!
//! A [`Schema`] declares everything the listing pipeline needs to know about
//! one resource type: its fields, named filters and sort fields, pagination
//! defaults, whether it can be counted, lifecycle listeners and document meta.
//!
//! Schemas are assembled with [`SchemaBuilder`] and frozen by
//! [`SchemaBuilder::build`]. A built schema has no interior mutability and all
//! of its callbacks are `Send + Sync`, so one instance is shared behind an
//! `Arc` by every concurrent request.
//!
//! # Example
//!
//! ```rust
//! use tessera_jsonapi::adapter::memory::MemoryAdapter;
//! use tessera_jsonapi::schema::{Attribute, Relationship, Schema};
//!
//! let schema = Schema::<MemoryAdapter>::builder()
//!     .attribute(Attribute::new("title").sortable().filterable())
//!     .has_one(Relationship::new("author", "people").filterable())
//!     .default_sort("-title")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.per_page(), Some(20));
//! assert!(schema.field("author").is_some());
//! ```

pub mod condition;
pub mod field;
pub mod filter;
pub mod listeners;

pub use condition::Condition;
pub use field::{Attribute, Field, Relationship};
pub use filter::{Filter, SortField};
pub use listeners::{ListenerEvent, Listeners};

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::adapter::Adapter;
use crate::context::Context;
use crate::error::ApiResult;
use crate::params::{ParamValue, SortDirection};
use crate::request::ListRequest;

/// Default page size when a schema does not set one.
pub const DEFAULT_PER_PAGE: u64 = 20;

/// Default maximum page size when a schema does not set one.
pub const DEFAULT_LIMIT: u64 = 50;

type MetaProducer<Q> = Box<dyn Fn(&Context<'_, Q>) -> Value + Send + Sync>;

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// Two filters share a name.
    #[error("duplicate filter: {0}")]
    DuplicateFilter(String),

    /// Two sort fields share a name.
    #[error("duplicate sort field: {0}")]
    DuplicateSortField(String),

    /// Two meta producers share a key.
    #[error("duplicate meta key: {0}")]
    DuplicateMeta(String),

    /// A page size of zero was configured.
    #[error("{0} must be at least 1")]
    ZeroPageSize(&'static str),
}

/// Immutable description of one resource type.
pub struct Schema<A: Adapter> {
    fields: IndexMap<String, Field>,
    filters: IndexMap<String, Filter<A::Query>>,
    sort_fields: IndexMap<String, SortField<A::Query>>,
    per_page: Option<u64>,
    limit: u64,
    countable: bool,
    default_sort: Option<String>,
    listeners: Listeners<A::Query, A::Model>,
    document_meta: IndexMap<String, MetaProducer<A::Query>>,
}

impl<A: Adapter> Schema<A> {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder<A> {
        SchemaBuilder::new()
    }

    /// Returns all fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Returns a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns a relationship field by name.
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.field(name).and_then(Field::as_relationship)
    }

    /// Returns a named filter.
    pub fn filter(&self, name: &str) -> Option<&Filter<A::Query>> {
        self.filters.get(name)
    }

    /// Returns a named sort field.
    pub fn sort_field(&self, name: &str) -> Option<&SortField<A::Query>> {
        self.sort_fields.get(name)
    }

    /// Returns the default page size, or `None` for unbounded listings.
    pub fn per_page(&self) -> Option<u64> {
        self.per_page
    }

    /// Returns the maximum page size a request may ask for.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns whether a total count is computed for listings.
    pub fn is_countable(&self) -> bool {
        self.countable
    }

    /// Returns the sort applied when a request has none.
    pub fn default_sort(&self) -> Option<&str> {
        self.default_sort.as_deref()
    }

    /// Returns the lifecycle listener tables.
    pub fn listeners(&self) -> &Listeners<A::Query, A::Model> {
        &self.listeners
    }

    /// Evaluates every document meta producer against a context.
    pub fn document_meta(&self, context: &Context<'_, A::Query>) -> Vec<(String, Value)> {
        self.document_meta
            .iter()
            .map(|(key, producer)| (key.clone(), producer(context)))
            .collect()
    }
}

impl<A: Adapter> fmt::Debug for Schema<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("sort_fields", &self.sort_fields.keys().collect::<Vec<_>>())
            .field("per_page", &self.per_page)
            .field("limit", &self.limit)
            .field("countable", &self.countable)
            .field("default_sort", &self.default_sort)
            .field("listeners", &self.listeners)
            .field("document_meta", &self.document_meta.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<A: Adapter> {
    schema: Schema<A>,
    error: Option<SchemaError>,
}

impl<A: Adapter> Default for SchemaBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Adapter> SchemaBuilder<A> {
    /// Creates a builder with default pagination (20 per page, at most 50)
    /// and counting enabled.
    pub fn new() -> Self {
        Self {
            schema: Schema {
                fields: IndexMap::new(),
                filters: IndexMap::new(),
                sort_fields: IndexMap::new(),
                per_page: Some(DEFAULT_PER_PAGE),
                limit: DEFAULT_LIMIT,
                countable: true,
                default_sort: None,
                listeners: Listeners::default(),
                document_meta: IndexMap::new(),
            },
            error: None,
        }
    }

    fn fail(&mut self, error: SchemaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Declares a field.
    pub fn field(mut self, field: Field) -> Self {
        let name = field.name().to_string();
        if self.schema.fields.contains_key(&name) {
            self.fail(SchemaError::DuplicateField(name));
        } else {
            self.schema.fields.insert(name, field);
        }
        self
    }

    /// Declares an attribute.
    pub fn attribute(self, attribute: Attribute) -> Self {
        self.field(Field::Attribute(attribute))
    }

    /// Declares a to-one relationship.
    pub fn has_one(self, relationship: Relationship) -> Self {
        self.field(Field::HasOne(relationship))
    }

    /// Declares a to-many relationship.
    pub fn has_many(self, relationship: Relationship) -> Self {
        self.field(Field::HasMany(relationship))
    }

    /// Declares a named filter from a callback.
    pub fn filter<F>(self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut A::Query, &ParamValue, &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        self.with_filter(Filter::new(name, callback))
    }

    /// Declares a prepared [`Filter`].
    pub fn with_filter(mut self, filter: Filter<A::Query>) -> Self {
        let name = filter.name().to_string();
        if self.schema.filters.contains_key(&name) {
            self.fail(SchemaError::DuplicateFilter(name));
        } else {
            self.schema.filters.insert(name, filter);
        }
        self
    }

    /// Declares a named sort field from a callback.
    pub fn sort<F>(self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut A::Query, SortDirection, &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        self.with_sort_field(SortField::new(name, callback))
    }

    /// Declares a prepared [`SortField`].
    pub fn with_sort_field(mut self, sort_field: SortField<A::Query>) -> Self {
        let name = sort_field.name().to_string();
        if self.schema.sort_fields.contains_key(&name) {
            self.fail(SchemaError::DuplicateSortField(name));
        } else {
            self.schema.sort_fields.insert(name, sort_field);
        }
        self
    }

    /// Sets the default page size; `None` lists everything by default.
    pub fn per_page(mut self, per_page: Option<u64>) -> Self {
        if per_page == Some(0) {
            self.fail(SchemaError::ZeroPageSize("per_page"));
        }
        self.schema.per_page = per_page;
        self
    }

    /// Sets the maximum page size a request may ask for.
    pub fn limit(mut self, limit: u64) -> Self {
        if limit == 0 {
            self.fail(SchemaError::ZeroPageSize("limit"));
        }
        self.schema.limit = limit;
        self
    }

    /// Sets both page sizes, e.g. from server configuration.
    pub fn with_page_sizes(self, per_page: u64, limit: u64) -> Self {
        self.per_page(Some(per_page)).limit(limit)
    }

    /// Enables or disables total counting.
    pub fn countable(mut self, countable: bool) -> Self {
        self.schema.countable = countable;
        self
    }

    /// Sets the sort used when a request has none, e.g. `-created,title`.
    pub fn default_sort(mut self, sort: impl Into<String>) -> Self {
        self.schema.default_sort = Some(sort.into());
        self
    }

    /// Adds a `listing` listener.
    pub fn on_listing<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        self.schema.listeners.push_listing(Box::new(listener));
        self
    }

    /// Adds a `scope` listener.
    pub fn on_scope<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut A::Query, &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        self.schema.listeners.push_scope(Box::new(listener));
        self
    }

    /// Adds a `listed` listener.
    pub fn on_listed<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut [A::Model], &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        self.schema.listeners.push_listed(Box::new(listener));
        self
    }

    /// Adds a document meta producer.
    pub fn meta<F>(mut self, key: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&Context<'_, A::Query>) -> Value + Send + Sync + 'static,
    {
        let key = key.into();
        if self.schema.document_meta.contains_key(&key) {
            self.fail(SchemaError::DuplicateMeta(key));
        } else {
            self.schema.document_meta.insert(key, Box::new(producer));
        }
        self
    }

    /// Freezes the schema.
    pub fn build(self) -> Result<Schema<A>, SchemaError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.schema),
        }
    }
}
