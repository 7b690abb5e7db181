//! Request-evaluated boolean settings.

use std::fmt;
use std::sync::Arc;

use crate::request::ListRequest;

type RequestPredicate = Arc<dyn Fn(&ListRequest) -> bool + Send + Sync>;

/// A flag that is either fixed at schema construction or decided per request.
///
/// Used for the `sortable` and `filterable` settings of fields.
#[derive(Clone)]
pub enum Condition {
    /// Always the given value.
    Fixed(bool),
    /// Evaluated against the current request.
    Request(RequestPredicate),
}

impl Condition {
    /// Creates a request-evaluated condition.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&ListRequest) -> bool + Send + Sync + 'static,
    {
        Condition::Request(Arc::new(predicate))
    }

    /// Evaluates the condition for a request.
    pub fn evaluate(&self, request: &ListRequest) -> bool {
        match self {
            Condition::Fixed(value) => *value,
            Condition::Request(predicate) => predicate(request),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Fixed(false)
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Fixed(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Condition::Request(_) => f.write_str("Request(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed() {
        let request = ListRequest::new("http://example.com/people");
        assert!(Condition::Fixed(true).evaluate(&request));
        assert!(!Condition::default().evaluate(&request));
    }

    #[test]
    fn test_request_predicate() {
        let condition = Condition::when(|request| request.param("admin").is_some());
        assert!(condition.evaluate(&ListRequest::new("http://example.com/people?admin=1")));
        assert!(!condition.evaluate(&ListRequest::new("http://example.com/people")));
    }
}
