//! Name resolution for sort and filter parameters.
//!
//! A name is tried against an ordered chain of resolvers; the first resolver
//! that claims the name decides how it is applied.
//!
//! | Resolver | Filter | Sort |
//! |----------|--------|------|
//! | `IdFilter` | `id` → filter by ids | - |
//! | `Named` | schema filter | schema sort field |
//! | `Field` | filterable attribute or relationship | sortable attribute |
//!
//! A name no resolver claims is an unknown field.

use std::fmt;

use crate::adapter::Adapter;
use crate::error::{ApiError, ApiResult};
use crate::request::ListRequest;
use crate::schema::{Attribute, Field, Filter, Relationship, Schema, SortField};

/// One step of a resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    /// The reserved `id` filter.
    IdFilter,
    /// A schema-level filter or sort field registered under the name.
    Named,
    /// A declared field whose sortable or filterable condition holds.
    Field,
}

/// Resolution order for `filter[<name>]`.
pub const FILTER_CHAIN: [Resolver; 3] = [Resolver::IdFilter, Resolver::Named, Resolver::Field];

/// Resolution order for `sort` terms.
pub const SORT_CHAIN: [Resolver; 2] = [Resolver::Named, Resolver::Field];

/// What a filter name resolved to.
pub enum FilterTarget<'s, Q> {
    /// The reserved `id` filter.
    Ids,
    /// A schema filter.
    Custom(&'s Filter<Q>),
    /// A filterable attribute.
    Attribute(&'s Attribute),
    /// A filterable to-one relationship.
    HasOne(&'s Relationship),
    /// A filterable to-many relationship.
    HasMany(&'s Relationship),
}

impl<Q> fmt::Debug for FilterTarget<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterTarget::Ids => f.write_str("Ids"),
            FilterTarget::Custom(filter) => f.debug_tuple("Custom").field(filter).finish(),
            FilterTarget::Attribute(attribute) => {
                f.debug_tuple("Attribute").field(&attribute.name()).finish()
            }
            FilterTarget::HasOne(relationship) => {
                f.debug_tuple("HasOne").field(&relationship.name()).finish()
            }
            FilterTarget::HasMany(relationship) => {
                f.debug_tuple("HasMany").field(&relationship.name()).finish()
            }
        }
    }
}

/// What a sort name resolved to.
pub enum SortTarget<'s, Q> {
    /// A schema sort field.
    Custom(&'s SortField<Q>),
    /// A sortable attribute.
    Attribute(&'s Attribute),
}

impl<Q> fmt::Debug for SortTarget<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortTarget::Custom(sort_field) => f.debug_tuple("Custom").field(sort_field).finish(),
            SortTarget::Attribute(attribute) => {
                f.debug_tuple("Attribute").field(&attribute.name()).finish()
            }
        }
    }
}

/// Resolves a `filter[<name>]` parameter.
pub fn resolve_filter<'s, A: Adapter>(
    schema: &'s Schema<A>,
    name: &str,
    request: &ListRequest,
) -> ApiResult<FilterTarget<'s, A::Query>> {
    FILTER_CHAIN
        .iter()
        .find_map(|resolver| match resolver {
            Resolver::IdFilter => (name == "id").then_some(FilterTarget::Ids),
            Resolver::Named => schema.filter(name).map(FilterTarget::Custom),
            Resolver::Field => schema
                .field(name)
                .filter(|field| field.is_filterable(request))
                .map(|field| match field {
                    Field::Attribute(attribute) => FilterTarget::Attribute(attribute),
                    Field::HasOne(relationship) => FilterTarget::HasOne(relationship),
                    Field::HasMany(relationship) => FilterTarget::HasMany(relationship),
                }),
        })
        .ok_or_else(|| ApiError::unknown_filter(name))
}

/// Resolves one `sort` term.
pub fn resolve_sort<'s, A: Adapter>(
    schema: &'s Schema<A>,
    name: &str,
    request: &ListRequest,
) -> ApiResult<SortTarget<'s, A::Query>> {
    SORT_CHAIN
        .iter()
        .find_map(|resolver| match resolver {
            Resolver::IdFilter => None,
            Resolver::Named => schema.sort_field(name).map(SortTarget::Custom),
            Resolver::Field => schema
                .field(name)
                .filter(|field| field.is_sortable(request))
                .and_then(Field::as_attribute)
                .map(SortTarget::Attribute),
        })
        .ok_or_else(|| ApiError::unknown_sort_field(name))
}
