//! The inbound listing request.

use http::HeaderMap;

use crate::params::{ParamValue, QueryParams};

/// A "list resources" request as seen by the pipeline.
///
/// Holds the fully qualified request URL, its decoded query parameters and the
/// request headers. `listing` listeners receive it mutably and may rewrite the
/// parameters before anything else reads them.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    url: String,
    params: QueryParams,
    headers: HeaderMap,
}

impl ListRequest {
    /// Creates a request from a fully qualified URL, decoding its query string.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let params = QueryParams::from_url(&url);
        Self {
            url,
            params,
            headers: HeaderMap::new(),
        }
    }

    /// Creates a request from a server base URL and an origin-form URI
    /// (`/articles?sort=title`).
    pub fn from_origin(base_url: &str, uri: &http::Uri) -> Self {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        Self::new(format!("{}{}", base_url.trim_end_matches('/'), path_and_query))
    }

    /// Sets the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the full request URL, including its original query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request URL without its query string.
    pub fn base_url(&self) -> &str {
        self.url
            .split_once('?')
            .map_or(self.url.as_str(), |(base, _)| base)
    }

    /// Returns the decoded query parameters.
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Returns the decoded query parameters mutably.
    pub fn params_mut(&mut self) -> &mut QueryParams {
        &mut self.params
    }

    /// Returns a single top-level query parameter.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
