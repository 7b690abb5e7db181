//! Nested query-string parameters.
//!
//! Query strings use bracketed keys to express structure: `page[limit]=10`
//! decodes to `{"page": {"limit": "10"}}`, `filter[author][name]=x` nests
//! twice and `include[]=a&include[]=b` appends under integer keys. Insertion
//! order is preserved so re-encoded links keep the caller's parameter order.

use indexmap::IndexMap;
use url::form_urlencoded;

/// A single decoded parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A key that appeared without `=`, or an explicit null override.
    Null,
    /// A scalar value.
    String(String),
    /// A bracketed group of parameters.
    Map(QueryParams),
}

impl ParamValue {
    /// Returns the scalar value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested parameters, if this is a group.
    pub fn as_map(&self) -> Option<&QueryParams> {
        match self {
            ParamValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns true for [`ParamValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<QueryParams> for ParamValue {
    fn from(value: QueryParams) -> Self {
        ParamValue::Map(value)
    }
}

/// Ordered, nested query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(IndexMap<String, ParamValue>);

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let has_value = pair.contains('=');
            for (key, value) in form_urlencoded::parse(pair.as_bytes()) {
                let value = if has_value {
                    ParamValue::String(value.into_owned())
                } else {
                    ParamValue::Null
                };
                let (base, segments) = split_key(&key);
                if base.is_empty() {
                    continue;
                }
                params.insert_path(base, &segments, value);
            }
        }

        params
    }

    /// Extracts and decodes the query string of a URL.
    pub fn from_url(url: &str) -> Self {
        url.split_once('?')
            .map(|(_, query)| Self::parse(query.split('#').next().unwrap_or_default()))
            .unwrap_or_default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.0.get_mut(key)
    }

    /// Returns the value stored under a nested path, e.g. `["page", "limit"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&ParamValue> {
        let (first, rest) = path.split_first()?;
        let value = self.get(first)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.as_map()?.get_path(rest)
        }
    }

    /// Inserts a value, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Iterates mutably over values in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut ParamValue> {
        self.0.values_mut()
    }

    /// Returns the number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with `overrides` merged in recursively.
    ///
    /// Override values win on conflict; when both sides hold a group the groups
    /// are merged key by key. Keys only present in `overrides` are appended.
    pub fn merged(&self, overrides: &QueryParams) -> QueryParams {
        let mut result = self.clone();
        result.replace_recursive(overrides);
        result
    }

    fn replace_recursive(&mut self, overrides: &QueryParams) {
        for (key, value) in overrides.iter() {
            match (self.0.get_mut(key), value) {
                (Some(ParamValue::Map(existing)), ParamValue::Map(incoming)) => {
                    existing.replace_recursive(incoming);
                }
                _ => {
                    self.0.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Encodes the parameters as a query string using bracketed keys.
    ///
    /// Null values and empty groups are omitted.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        self.flatten_into(None, &mut pairs);

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    fn flatten_into(&self, prefix: Option<&str>, pairs: &mut Vec<(String, String)>) {
        for (key, value) in self.iter() {
            let name = match prefix {
                Some(prefix) => format!("{}[{}]", prefix, key),
                None => key.clone(),
            };
            match value {
                ParamValue::Null => {}
                ParamValue::String(value) => pairs.push((name, value.clone())),
                ParamValue::Map(map) => map.flatten_into(Some(&name), pairs),
            }
        }
    }

    fn insert_path(&mut self, key: String, segments: &[String], value: ParamValue) {
        let key = if key.is_empty() {
            self.next_index()
        } else {
            key
        };

        let Some((next, rest)) = segments.split_first() else {
            self.0.insert(key, value);
            return;
        };

        let entry = self
            .0
            .entry(key)
            .or_insert_with(|| ParamValue::Map(QueryParams::new()));
        if !matches!(entry, ParamValue::Map(_)) {
            *entry = ParamValue::Map(QueryParams::new());
        }
        if let ParamValue::Map(child) = entry {
            child.insert_path(next.clone(), rest, value);
        }
    }

    fn next_index(&self) -> String {
        self.0
            .keys()
            .filter_map(|key| key.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1)
            .to_string()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Splits `a[b][c]` into `("a", ["b", "c"])`.
///
/// Keys that start with `[` or have no brackets are returned whole. Text after
/// an unterminated bracket is ignored.
fn split_key(key: &str) -> (String, Vec<String>) {
    let Some(open) = key.find('[') else {
        return (key.to_string(), Vec::new());
    };
    if open == 0 {
        return (key.to_string(), Vec::new());
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            break;
        };
        segments.push(stripped[..close].to_string());
        rest = &stripped[close + 1..];
    }

    (key[..open].to_string(), segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_keys() {
        let params = QueryParams::parse("page%5Blimit%5D=10&page[offset]=20&sort=-age");
        assert_eq!(
            params.get_path(&["page", "limit"]),
            Some(&ParamValue::from("10"))
        );
        assert_eq!(
            params.get_path(&["page", "offset"]),
            Some(&ParamValue::from("20"))
        );
        assert_eq!(params.get("sort"), Some(&ParamValue::from("-age")));
    }

    #[test]
    fn test_parse_key_without_value_is_null() {
        let params = QueryParams::parse("filter[title]&filter[author]=");
        let filter = params.get("filter").and_then(ParamValue::as_map).unwrap();
        assert!(filter.get("title").unwrap().is_null());
        assert_eq!(filter.get("author"), Some(&ParamValue::from("")));
    }

    #[test]
    fn test_parse_append_brackets() {
        let params = QueryParams::parse("include[]=author&include[]=comments");
        let include = params.get("include").and_then(ParamValue::as_map).unwrap();
        assert_eq!(include.get("0"), Some(&ParamValue::from("author")));
        assert_eq!(include.get("1"), Some(&ParamValue::from("comments")));
    }

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let params = QueryParams::parse("filter[title]=hello+world%21&q=a%3Db");
        assert_eq!(
            params.get_path(&["filter", "title"]),
            Some(&ParamValue::from("hello world!"))
        );
        assert_eq!(params.get("q"), Some(&ParamValue::from("a=b")));
    }

    #[test]
    fn test_from_url_ignores_fragment() {
        let params = QueryParams::from_url("http://example.com/articles?sort=title#top");
        assert_eq!(params.get("sort"), Some(&ParamValue::from("title")));
        assert!(QueryParams::from_url("http://example.com/articles").is_empty());
    }

    #[test]
    fn test_merged_is_deep_and_override_wins() {
        let base = QueryParams::parse("page[limit]=10&page[offset]=5&sort=name");
        let overrides = QueryParams::new().with(
            "page",
            QueryParams::new().with("offset", 20u64),
        );

        let merged = base.merged(&overrides);
        assert_eq!(
            merged.get_path(&["page", "limit"]),
            Some(&ParamValue::from("10"))
        );
        assert_eq!(
            merged.get_path(&["page", "offset"]),
            Some(&ParamValue::from("20"))
        );
        let keys: Vec<_> = merged.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["page", "sort"]);
    }

    #[test]
    fn test_merged_appends_new_keys() {
        let base = QueryParams::parse("sort=name");
        let overrides = QueryParams::new().with("page", QueryParams::new().with("offset", 0u64));
        let merged = base.merged(&overrides);
        let keys: Vec<_> = merged.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["sort", "page"]);
    }

    #[test]
    fn test_to_query_string_brackets_and_skips_null() {
        let params = QueryParams::new()
            .with("filter", QueryParams::new().with("a", ParamValue::Null).with("b", "x y"))
            .with("page", QueryParams::new())
            .with("sort", "-age");
        assert_eq!(params.to_query_string(), "filter%5Bb%5D=x+y&sort=-age");
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let params = QueryParams::parse("filter[author][name]=Ann&page[limit]=5");
        let reparsed = QueryParams::parse(&params.to_query_string());
        assert_eq!(params, reparsed);
    }

    #[test]
    fn test_split_key_edge_cases() {
        assert_eq!(split_key("plain"), ("plain".to_string(), vec![]));
        assert_eq!(split_key("[odd]"), ("[odd]".to_string(), vec![]));
        assert_eq!(
            split_key("a[b][c"),
            ("a".to_string(), vec!["b".to_string()])
        );
    }
}
