//! Query parameter interpretation.
//!
//! Turns raw, string-keyed request parameters into typed pagination, sort and
//! filter intents. Nothing in this module touches the adapter.
//!
//! | Parameter | Shape | Intent |
//! |-----------|-------|--------|
//! | `sort` | `field1,-field2` | [`SortTerm`] list |
//! | `page[limit]` | decimal, `>= 1` | [`Page::limit`] |
//! | `page[offset]` | decimal, `>= 0` | [`Page::offset`] |
//! | `filter[name]` | scalar or group | filter map |
//! | `include` | `rel,rel.nested` | [`IncludeTree`](crate::include::IncludeTree) |

pub mod query;

pub use query::{ParamValue, QueryParams};

use std::fmt;

use crate::error::{ApiError, ApiResult};

/// Sort direction for a single sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the lowercase name of the direction.
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed entry of the `sort` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTerm {
    /// The field or sort-field name.
    pub field: String,
    /// The requested direction.
    pub direction: SortDirection,
}

impl SortTerm {
    /// Creates a sort term.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Parses a sort parameter value such as `-age,name`.
///
/// Terms keep their written order; repeated names are kept as separate terms.
/// An empty string yields no terms.
pub fn parse_sort(raw: &str) -> Vec<SortTerm> {
    if raw.is_empty() {
        return Vec::new();
    }

    raw.split(',')
        .map(|token| match token.strip_prefix('-') {
            Some(field) => SortTerm::new(field, SortDirection::Desc),
            None => SortTerm::new(token, SortDirection::Asc),
        })
        .collect()
}

/// Returns the raw `sort` value of a request, if a non-empty one was given.
pub fn sort_param(params: &QueryParams) -> ApiResult<Option<&str>> {
    match params.get("sort") {
        None | Some(ParamValue::Null) => Ok(None),
        Some(ParamValue::String(raw)) if raw.is_empty() => Ok(None),
        Some(ParamValue::String(raw)) => Ok(Some(raw)),
        Some(ParamValue::Map(_)) => Err(ApiError::invalid_parameter(
            "sort",
            "sort must be a string",
        )),
    }
}

/// Pagination intent for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Number of leading results to skip.
    pub offset: u64,
    /// Maximum number of results, or `None` for an unbounded listing.
    pub limit: Option<u64>,
}

impl Page {
    /// Returns true when the adapter needs to apply pagination at all.
    pub fn is_bounded(&self) -> bool {
        self.limit.is_some() || self.offset > 0
    }
}

/// Parses `page[limit]` and `page[offset]`.
///
/// `per_page` is the schema default used when no limit is requested; a
/// requested limit is clamped to `max_limit`.
pub fn parse_pagination(
    params: &QueryParams,
    per_page: Option<u64>,
    max_limit: u64,
) -> ApiResult<Page> {
    let mut limit = per_page;

    if let Some(raw) = page_param(params, "limit") {
        let requested = raw
            .and_then(parse_digits)
            .filter(|value| *value >= 1)
            .ok_or_else(|| {
                ApiError::invalid_parameter(
                    "page[limit]",
                    "page[limit] must be a positive integer",
                )
            })?;
        limit = Some(requested.min(max_limit));
    }

    let mut offset = 0;

    if let Some(raw) = page_param(params, "offset") {
        offset = raw.and_then(parse_digits).ok_or_else(|| {
            ApiError::invalid_parameter(
                "page[offset]",
                "page[offset] must be a non-negative integer",
            )
        })?;
    }

    Ok(Page { offset, limit })
}

/// Looks up `page[<name>]`.
///
/// Returns `None` when absent, `Some(None)` when present but not a scalar.
fn page_param<'a>(params: &'a QueryParams, name: &str) -> Option<Option<&'a str>> {
    match params.get_path(&["page", name])? {
        ParamValue::Null => None,
        ParamValue::String(value) => Some(Some(value)),
        ParamValue::Map(_) => Some(None),
    }
}

/// Parses a string made only of ASCII digits; values beyond `u64` are rejected.
fn parse_digits(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Returns the `filter` group of a request.
///
/// An absent, null or empty `filter` means no filtering. Any other scalar is
/// rejected.
pub fn parse_filter(params: &QueryParams) -> ApiResult<Option<&QueryParams>> {
    match params.get("filter") {
        None | Some(ParamValue::Null) => Ok(None),
        Some(ParamValue::String(raw)) if raw.is_empty() => Ok(None),
        Some(ParamValue::String(_)) => Err(ApiError::invalid_parameter(
            "filter",
            "filter must be an array",
        )),
        Some(ParamValue::Map(filter)) => Ok(Some(filter)),
    }
}

/// Returns the scalar value of `filter[<name>]`, treating null as empty.
pub fn filter_scalar<'a>(name: &str, value: &'a ParamValue) -> ApiResult<&'a str> {
    match value {
        ParamValue::Null => Ok(""),
        ParamValue::String(value) => Ok(value),
        ParamValue::Map(_) => Err(ApiError::invalid_parameter(
            format!("filter[{}]", name),
            format!("filter[{}] must be a string", name),
        )),
    }
}

/// Splits a comma-separated list such as an id filter value.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> QueryParams {
        QueryParams::parse(query)
    }

    #[test]
    fn test_parse_sort_order_and_direction() {
        let terms = parse_sort("-age,name");
        assert_eq!(
            terms,
            vec![
                SortTerm::new("age", SortDirection::Desc),
                SortTerm::new("name", SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_parse_sort_keeps_duplicates() {
        let terms = parse_sort("name,-name");
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[1].direction, SortDirection::Desc);
    }

    #[test]
    fn test_parse_sort_empty() {
        assert!(parse_sort("").is_empty());
    }

    #[test]
    fn test_sort_param_rejects_group() {
        let err = sort_param(&params("sort[a]=1")).unwrap_err();
        assert_eq!(err.source_parameter().as_deref(), Some("sort"));
        assert_eq!(sort_param(&params("sort=")).unwrap(), None);
        assert_eq!(sort_param(&params("sort=-a")).unwrap(), Some("-a"));
    }

    #[test]
    fn test_pagination_defaults() {
        let page = parse_pagination(&params(""), Some(20), 50).unwrap();
        assert_eq!(
            page,
            Page {
                offset: 0,
                limit: Some(20)
            }
        );
        assert!(page.is_bounded());
    }

    #[test]
    fn test_pagination_unbounded() {
        let page = parse_pagination(&params(""), None, 50).unwrap();
        assert_eq!(
            page,
            Page {
                offset: 0,
                limit: None
            }
        );
        assert!(!page.is_bounded());
    }

    #[test]
    fn test_pagination_limit_clamped_to_max() {
        let page = parse_pagination(&params("page[limit]=10"), Some(2), 5).unwrap();
        assert_eq!(page.limit, Some(5));
    }

    #[test]
    fn test_pagination_invalid_limits() {
        for query in [
            "page[limit]=0",
            "page[limit]=-1",
            "page[limit]=abc",
            "page[limit]=",
            "page[limit][x]=1",
        ] {
            let err = parse_pagination(&params(query), Some(20), 50).unwrap_err();
            assert_eq!(err.to_string(), "page[limit] must be a positive integer");
            assert_eq!(err.source_parameter().as_deref(), Some("page[limit]"));
        }
    }

    #[test]
    fn test_pagination_offset() {
        let page = parse_pagination(&params("page[offset]=30"), Some(10), 50).unwrap();
        assert_eq!(page.offset, 30);

        let err = parse_pagination(&params("page[offset]=-1"), Some(10), 50).unwrap_err();
        assert_eq!(err.to_string(), "page[offset] must be a non-negative integer");
        assert_eq!(err.source_parameter().as_deref(), Some("page[offset]"));
    }

    #[test]
    fn test_pagination_rejects_values_beyond_u64() {
        let huge = "99999999999999999999999";

        let err = parse_pagination(&params(&format!("page[offset]={}", huge)), Some(10), 50)
            .unwrap_err();
        assert_eq!(err.to_string(), "page[offset] must be a non-negative integer");

        let err = parse_pagination(&params(&format!("page[limit]={}", huge)), Some(10), 50)
            .unwrap_err();
        assert_eq!(err.to_string(), "page[limit] must be a positive integer");

        let page = parse_pagination(&params("page[offset]=18446744073709551615"), None, 50)
            .unwrap();
        assert_eq!(page.offset, u64::MAX);
    }

    #[test]
    fn test_pagination_offset_zero_is_valid() {
        let page = parse_pagination(&params("page[offset]=0"), None, 50).unwrap();
        assert_eq!(page.offset, 0);
        assert!(!page.is_bounded());
    }

    #[test]
    fn test_parse_filter_shapes() {
        assert!(parse_filter(&params("")).unwrap().is_none());
        assert!(parse_filter(&params("filter=")).unwrap().is_none());

        let err = parse_filter(&params("filter=abc")).unwrap_err();
        assert_eq!(err.to_string(), "filter must be an array");
        assert_eq!(err.source_parameter().as_deref(), Some("filter"));

        let raw = params("filter[title]=x");
        let filter = parse_filter(&raw).unwrap().unwrap();
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_filter_scalar() {
        assert_eq!(filter_scalar("a", &ParamValue::Null).unwrap(), "");
        assert_eq!(filter_scalar("a", &ParamValue::from("x")).unwrap(), "x");
        let err = filter_scalar("a", &ParamValue::Map(QueryParams::new())).unwrap_err();
        assert_eq!(err.source_parameter().as_deref(), Some("filter[a]"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("1,2,3"), vec!["1", "2", "3"]);
        assert_eq!(split_list("7"), vec!["7"]);
    }
}
