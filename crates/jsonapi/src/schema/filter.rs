//! Named filter and sort overrides.

use std::fmt;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::params::{ParamValue, SortDirection};
use crate::request::ListRequest;

type FilterCallback<Q> =
    Arc<dyn Fn(&mut Q, &ParamValue, &ListRequest) -> ApiResult<()> + Send + Sync>;
type SortCallback<Q> =
    Arc<dyn Fn(&mut Q, SortDirection, &ListRequest) -> ApiResult<()> + Send + Sync>;

/// A named filter that mutates the adapter query directly.
///
/// A filter takes precedence over a field of the same name.
pub struct Filter<Q> {
    name: String,
    callback: FilterCallback<Q>,
}

impl<Q> Filter<Q> {
    /// Creates a filter.
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Q, &ParamValue, &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }

    /// Returns the filter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the filter to a query.
    pub fn apply(&self, query: &mut Q, value: &ParamValue, request: &ListRequest) -> ApiResult<()> {
        (self.callback)(query, value, request)
    }
}

impl<Q> fmt::Debug for Filter<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named sort handler.
///
/// A sort field takes precedence over a sortable attribute of the same name.
pub struct SortField<Q> {
    name: String,
    callback: SortCallback<Q>,
}

impl<Q> SortField<Q> {
    /// Creates a sort field.
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Q, SortDirection, &ListRequest) -> ApiResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }

    /// Returns the sort field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the sort to a query.
    pub fn apply(
        &self,
        query: &mut Q,
        direction: SortDirection,
        request: &ListRequest,
    ) -> ApiResult<()> {
        (self.callback)(query, direction, request)
    }
}

impl<Q> fmt::Debug for SortField<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
