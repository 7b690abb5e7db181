//! Listing document assembly.
//!
//! A listing response is a JSON:API compound document:
//!
//! ```json
//! {
//!   "links": { "self": "...", "first": "...", "prev": "...", "last": "...", "next": "..." },
//!   "data": [ ... ],
//!   "included": [ ... ],
//!   "meta": { "offset": 0, "limit": 20, "total": 42 }
//! }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::links::PaginationLinks;
use crate::serializer::ResourceObject;

/// The JSON:API media type.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Top-level links of a listing document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentLinks {
    /// The request URL.
    #[serde(rename = "self")]
    pub self_link: String,
    /// First page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A listing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Self and pagination links.
    pub links: DocumentLinks,
    /// Primary resources.
    pub data: Vec<ResourceObject>,
    /// Related resources, unique by type and id.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    /// Pagination meta followed by schema meta.
    pub meta: IndexMap<String, Value>,
}

impl Document {
    /// Starts building a document.
    pub fn builder(self_link: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(self_link)
    }

    /// Converts the document to JSON.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builder for [`Document`].
#[derive(Debug)]
pub struct DocumentBuilder {
    links: DocumentLinks,
    data: Vec<ResourceObject>,
    included: Vec<ResourceObject>,
    meta: IndexMap<String, Value>,
}

impl DocumentBuilder {
    /// Creates a builder with a self link.
    pub fn new(self_link: impl Into<String>) -> Self {
        Self {
            links: DocumentLinks {
                self_link: self_link.into(),
                ..Default::default()
            },
            data: Vec::new(),
            included: Vec::new(),
            meta: IndexMap::new(),
        }
    }

    /// Sets the pagination links.
    pub fn pagination(mut self, links: PaginationLinks) -> Self {
        self.links.first = links.first;
        self.links.prev = links.prev;
        self.links.last = links.last;
        self.links.next = links.next;
        self
    }

    /// Sets the primary resources.
    pub fn data(mut self, data: Vec<ResourceObject>) -> Self {
        self.data = data;
        self
    }

    /// Sets the included resources.
    pub fn included(mut self, included: Vec<ResourceObject>) -> Self {
        self.included = included;
        self
    }

    /// Adds a meta entry. A later entry with the same key replaces the value
    /// but keeps the original position.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Builds the document.
    pub fn build(self) -> Document {
        Document {
            links: self.links,
            data: self.data,
            included: self.included,
            meta: self.meta,
        }
    }
}

/// A document rendered with the JSON:API media type.
#[derive(Debug, Clone)]
pub struct JsonApiResponse(pub Document);

impl IntoResponse for JsonApiResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self.0)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        response
    }
}

impl IntoResponse for Document {
    fn into_response(self) -> Response {
        JsonApiResponse(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let doc = Document::builder("http://example.com/articles")
            .pagination(PaginationLinks {
                next: Some("http://example.com/articles?page%5Boffset%5D=20".to_string()),
                ..Default::default()
            })
            .meta("offset", 0)
            .meta("limit", 20)
            .meta("total", 42)
            .build();

        let json = doc.to_json();
        assert_eq!(json["links"]["self"], "http://example.com/articles");
        assert!(json["links"].get("prev").is_none());
        assert_eq!(json["data"], serde_json::json!([]));
        assert!(json.get("included").is_none());
        assert_eq!(json["meta"]["total"], 42);

        let keys: Vec<_> = doc.meta.keys().cloned().collect();
        assert_eq!(keys, vec!["offset", "limit", "total"]);
    }

    #[test]
    fn test_response_media_type() {
        let response = Document::builder("http://example.com/articles")
            .build()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            MEDIA_TYPE
        );
    }
}
