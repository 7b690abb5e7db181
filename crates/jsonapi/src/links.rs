//! Link construction for listing documents.
//!
//! Links are rebuilt from the request URL with its query parameters
//! re-encoded, so every link carries the same filters, sort and include as
//! the request it was generated for. Only `page[...]` changes between
//! pagination links.

use crate::params::{ParamValue, QueryParams};
use crate::request::ListRequest;

/// Builds canonical URLs for one request.
#[derive(Debug, Clone, Copy)]
pub struct LinkBuilder<'a> {
    request: &'a ListRequest,
}

impl<'a> LinkBuilder<'a> {
    /// Creates a builder for a request.
    pub fn new(request: &'a ListRequest) -> Self {
        Self { request }
    }

    /// Returns the request URL with its parameters re-encoded.
    pub fn self_link(&self) -> String {
        self.build_url(&QueryParams::new())
    }

    /// Builds a URL from the request with `overrides` deep-merged into its
    /// query parameters.
    ///
    /// A non-positive `page[offset]` is dropped and null `filter[...]` values
    /// are rendered as empty strings.
    pub fn build_url(&self, overrides: &QueryParams) -> String {
        let mut params = self.request.params().merged(overrides);

        if let Some(ParamValue::Map(page)) = params.get_mut("page") {
            if page.get("offset").is_some_and(is_non_positive) {
                page.remove("offset");
            }
            if page.is_empty() {
                params.remove("page");
            }
        }

        if let Some(ParamValue::Map(filter)) = params.get_mut("filter") {
            for value in filter.values_mut() {
                if value.is_null() {
                    *value = ParamValue::from("");
                }
            }
        }

        let query = params.to_query_string();
        let base = self.request.base_url();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, query)
        }
    }

    /// Computes the pagination links for a page of results.
    pub fn pagination(&self, window: &PageWindow, policy: &LinkPolicy) -> PaginationLinks {
        let mut links = PaginationLinks::default();
        let PageWindow {
            offset,
            limit,
            count,
            total,
        } = *window;

        if offset > 0 {
            links.first = Some(self.build_url(&page_overrides(0, None)));

            let prev = match limit {
                Some(limit) if limit > offset => page_overrides(0, Some(offset)),
                Some(limit) => page_overrides(offset - limit, None),
                None => page_overrides(0, None),
            };
            links.prev = Some(self.build_url(&prev));
        }

        if let Some(limit) = limit {
            let has_more = total.is_some_and(|total| offset.saturating_add(limit) < total);

            if policy.countable && policy.paginated && has_more {
                let total = total.unwrap_or_default();
                let last = (total - 1) / limit * limit;
                links.last = Some(self.build_url(&page_overrides(last, None)));
            }

            if (total.is_none() && count == limit) || has_more {
                links.next = Some(
                    self.build_url(&page_overrides(offset.saturating_add(limit), None)),
                );
            }
        }

        links
    }
}

/// Builds a URL for `request` with `overrides` merged into its parameters.
pub fn build_url(request: &ListRequest, overrides: &QueryParams) -> String {
    LinkBuilder::new(request).build_url(overrides)
}

/// Position and size of the returned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Offset the page starts at.
    pub offset: u64,
    /// Effective page size, or `None` for an unbounded listing.
    pub limit: Option<u64>,
    /// Number of models actually returned.
    pub count: u64,
    /// Total number of matching models, when counted.
    pub total: Option<u64>,
}

/// Schema properties that decide which links may be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// The resource type computes totals.
    pub countable: bool,
    /// The resource type has a default page size.
    pub paginated: bool,
}

/// The optional pagination links of a listing document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationLinks {
    /// Link to the first page.
    pub first: Option<String>,
    /// Link to the previous page.
    pub prev: Option<String>,
    /// Link to the last page.
    pub last: Option<String>,
    /// Link to the next page.
    pub next: Option<String>,
}

fn page_overrides(offset: u64, limit: Option<u64>) -> QueryParams {
    let mut page = QueryParams::new().with("offset", offset);
    if let Some(limit) = limit {
        page.insert("limit", limit);
    }
    QueryParams::new().with("page", page)
}

fn is_non_positive(value: &ParamValue) -> bool {
    match value {
        ParamValue::Null => true,
        ParamValue::String(raw) => raw.trim().parse::<i64>().is_ok_and(|offset| offset <= 0),
        ParamValue::Map(_) => false,
    }
}
