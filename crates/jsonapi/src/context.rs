//! Assembly-time context handed to document meta producers.

use crate::request::ListRequest;

/// Read-only view of one request's final state.
///
/// Created once per request after the result set is fetched; meta producers
/// use it to inspect the query object that produced the page.
#[derive(Debug)]
pub struct Context<'a, Q> {
    query: &'a Q,
    request: &'a ListRequest,
}

impl<'a, Q> Context<'a, Q> {
    /// Creates a context.
    pub fn new(query: &'a Q, request: &'a ListRequest) -> Self {
        Self { query, request }
    }

    /// Returns the query object as it was when the results were fetched.
    pub fn query(&self) -> &'a Q {
        self.query
    }

    /// Returns the request.
    pub fn request(&self) -> &'a ListRequest {
        self.request
    }
}
