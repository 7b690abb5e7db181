//! Lifecycle listener tables.
//!
//! Listeners run in registration order. The pipeline invokes them at fixed
//! points:
//!
//! 1. `listing` before the query object exists; may rewrite the request.
//! 2. `scope` right after the query object is created, before any
//!    user-supplied pagination, sort or filter.
//! 3. `listed` after the result set (and its relationships) is loaded.

use std::fmt;

use crate::error::ApiResult;
use crate::request::ListRequest;

type ListingListener = Box<dyn Fn(&mut ListRequest) -> ApiResult<()> + Send + Sync>;
type ScopeListener<Q> = Box<dyn Fn(&mut Q, &ListRequest) -> ApiResult<()> + Send + Sync>;
type ListedListener<M> = Box<dyn Fn(&mut [M], &ListRequest) -> ApiResult<()> + Send + Sync>;

/// The lifecycle events a schema can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerEvent {
    /// Before the query object is created.
    Listing,
    /// Global query narrowing.
    Scope,
    /// After models are fetched.
    Listed,
}

/// Typed callback tables for one resource schema.
pub struct Listeners<Q, M> {
    listing: Vec<ListingListener>,
    scope: Vec<ScopeListener<Q>>,
    listed: Vec<ListedListener<M>>,
}

impl<Q, M> Default for Listeners<Q, M> {
    fn default() -> Self {
        Self {
            listing: Vec::new(),
            scope: Vec::new(),
            listed: Vec::new(),
        }
    }
}

impl<Q, M> Listeners<Q, M> {
    pub(crate) fn push_listing(&mut self, listener: ListingListener) {
        self.listing.push(listener);
    }

    pub(crate) fn push_scope(&mut self, listener: ScopeListener<Q>) {
        self.scope.push(listener);
    }

    pub(crate) fn push_listed(&mut self, listener: ListedListener<M>) {
        self.listed.push(listener);
    }

    /// Returns the number of listeners registered for an event.
    pub fn count(&self, event: ListenerEvent) -> usize {
        match event {
            ListenerEvent::Listing => self.listing.len(),
            ListenerEvent::Scope => self.scope.len(),
            ListenerEvent::Listed => self.listed.len(),
        }
    }

    /// Runs the `listing` listeners.
    pub fn run_listing(&self, request: &mut ListRequest) -> ApiResult<()> {
        self.listing.iter().try_for_each(|listener| listener(&mut *request))
    }

    /// Runs the `scope` listeners.
    pub fn run_scope(&self, query: &mut Q, request: &ListRequest) -> ApiResult<()> {
        self.scope
            .iter()
            .try_for_each(|listener| listener(&mut *query, request))
    }

    /// Runs the `listed` listeners.
    pub fn run_listed(&self, models: &mut [M], request: &ListRequest) -> ApiResult<()> {
        self.listed
            .iter()
            .try_for_each(|listener| listener(&mut *models, request))
    }
}

impl<Q, M> fmt::Debug for Listeners<Q, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("listing", &self.listing.len())
            .field("scope", &self.scope.len())
            .field("listed", &self.listed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::params::ParamValue;

    #[test]
    fn test_listeners_run_in_order_and_stop_on_error() {
        let mut listeners: Listeners<Vec<&'static str>, ()> = Listeners::default();
        listeners.push_scope(Box::new(|query: &mut Vec<&'static str>, _: &ListRequest| {
            query.push("first");
            Ok(())
        }));
        listeners.push_scope(Box::new(|_: &mut Vec<&'static str>, _: &ListRequest| {
            Err(ApiError::BadRequest {
                message: "stop".to_string(),
                parameter: None,
            })
        }));
        listeners.push_scope(Box::new(|query: &mut Vec<&'static str>, _: &ListRequest| {
            query.push("never");
            Ok(())
        }));

        let mut query = Vec::new();
        let request = ListRequest::new("http://example.com/people");
        assert!(listeners.run_scope(&mut query, &request).is_err());
        assert_eq!(query, vec!["first"]);
        assert_eq!(listeners.count(ListenerEvent::Scope), 3);
    }

    #[test]
    fn test_listing_listener_rewrites_request() {
        let mut listeners: Listeners<(), ()> = Listeners::default();
        listeners.push_listing(Box::new(|request: &mut ListRequest| {
            request.params_mut().insert("sort", "-created");
            Ok(())
        }));

        let mut request = ListRequest::new("http://example.com/people");
        listeners.run_listing(&mut request).unwrap();
        assert_eq!(request.param("sort"), Some(&ParamValue::from("-created")));
    }
}
