//! Data adapter abstraction.
//!
//! The listing pipeline never talks to a data store directly. It drives an
//! [`Adapter`] through a fixed sequence of calls against an opaque,
//! adapter-defined query object:
//!
//! - [`Adapter`] - Query construction, counting, fetching and relationship loading
//! - [`ResourceModel`] - Read access to fetched models for serialization
//!
//! A reference implementation backed by an in-process store lives in
//! [`memory`].

pub mod memory;

use serde_json::Value;
use thiserror::Error;

use crate::params::SortDirection;
use crate::schema::{Attribute, Relationship};

/// Error reported by an adapter.
///
/// The pipeline never inspects or retries adapter errors; they propagate to
/// the caller unchanged as [`ApiError::Adapter`](crate::error::ApiError::Adapter).
#[derive(Debug, Error)]
#[error("adapter error: {message}")]
pub struct AdapterError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AdapterError {
    /// Creates an adapter error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an adapter error wrapping an underlying cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Related models loaded onto a model.
#[derive(Debug)]
pub enum Related<'a, M> {
    /// The relationship has not been loaded.
    NotLoaded,
    /// A to-one relationship; `None` when empty.
    One(Option<&'a M>),
    /// A to-many relationship.
    Many(Vec<&'a M>),
}

/// Read access to a fetched model.
pub trait ResourceModel {
    /// Returns the model's identifier.
    fn id(&self) -> String;

    /// Returns an attribute value, or `None` when the model has no such attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Returns the models loaded for a relationship.
    fn related(&self, name: &str) -> Related<'_, Self>
    where
        Self: Sized;
}

/// Translates abstract listing operations into data-store operations.
///
/// One adapter instance serves one resource type. The pipeline calls
/// [`query`](Adapter::query) once per request and then mutates the returned
/// query object sequentially; it is never shared between requests.
///
/// All resource types registered on one [`JsonApi`](crate::JsonApi) share an
/// adapter type, so related models loaded onto a model have the same
/// [`Model`](Adapter::Model) type.
pub trait Adapter: Send + Sync + 'static {
    /// The in-progress query representation.
    type Query: Send;

    /// The fetched model type.
    type Model: ResourceModel + Send;

    /// Creates a fresh query object.
    fn query(&self) -> Self::Query;

    /// Restricts the query to a window of results.
    ///
    /// Only called when a limit is set or the offset is positive.
    fn paginate(
        &self,
        query: &mut Self::Query,
        offset: u64,
        limit: Option<u64>,
    ) -> AdapterResult<()>;

    /// Appends an attribute sort key.
    fn sort_by_attribute(
        &self,
        query: &mut Self::Query,
        attribute: &Attribute,
        direction: SortDirection,
    ) -> AdapterResult<()>;

    /// Restricts the query to models with one of the given ids.
    fn filter_by_ids(&self, query: &mut Self::Query, ids: &[String]) -> AdapterResult<()>;

    /// Restricts the query to models whose attribute equals `value`.
    fn filter_by_attribute(
        &self,
        query: &mut Self::Query,
        attribute: &Attribute,
        value: &str,
    ) -> AdapterResult<()>;

    /// Restricts the query to models whose to-one relationship points at one of `ids`.
    fn filter_by_has_one(
        &self,
        query: &mut Self::Query,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()>;

    /// Restricts the query to models whose to-many relationship contains any of `ids`.
    fn filter_by_has_many(
        &self,
        query: &mut Self::Query,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()>;

    /// Counts all models matching the query, ignoring pagination.
    fn count(&self, query: &Self::Query) -> AdapterResult<u64>;

    /// Fetches the models matching the query.
    fn get(&self, query: &Self::Query) -> AdapterResult<Vec<Self::Model>>;

    /// Loads the relationship at the end of `path` onto `models`.
    ///
    /// `models` are always the primary models; `path` walks from them through
    /// already-loaded relationships. When `linkage_only` is set the adapter
    /// only needs to load enough to identify the related models.
    fn load(
        &self,
        models: &mut [Self::Model],
        path: &[&Relationship],
        linkage_only: bool,
    ) -> AdapterResult<()>;
}
