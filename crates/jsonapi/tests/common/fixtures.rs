//! Blog fixtures: people, articles and comments.
//!
//! | Article | Title | Rank | Published | Author | Comments |
//! |---------|-------|------|-----------|--------|----------|
//! | 1 | Alpha | 3 | yes | 1 | 1, 2 |
//! | 2 | Bravo | 1 | no | 2 | 3 |
//! | 3 | Charlie | 5 | yes | 1 | - |
//! | 4 | Delta | 2 | yes | 3 | 4 |
//! | 5 | Echo | 4 | yes | - | - |
//!
//! Comment authors: 1 → 2, 2 → 1, 3 → 3, 4 → 2.

use std::sync::Arc;

use serde_json::{Value, json};
use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryQuery, MemoryStore, Record};
use tessera_jsonapi::context::Context;
use tessera_jsonapi::schema::{Attribute, Relationship, Schema, SchemaBuilder};
use tessera_jsonapi::{Adapter, ApiResult, Document, JsonApi, ListRequest};

pub const BASE_URL: &str = "http://example.com";

pub fn blog_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store.extend(
        "people",
        [
            Record::new("1").attribute("name", json!("Ada")),
            Record::new("2").attribute("name", json!("Grace")),
            Record::new("3").attribute("name", json!("Linus")),
        ],
    );

    let article = |id: &str,
                   title: &str,
                   rank: u64,
                   published: bool,
                   author: Option<&str>,
                   comments: &[&str]| {
        Record::new(id)
            .attribute("title", json!(title))
            .attribute("rank", json!(rank))
            .attribute("published", json!(published))
            .has_one("author", author)
            .has_many("comments", comments.iter().copied())
    };
    store.extend(
        "articles",
        [
            article("1", "Alpha", 3, true, Some("1"), &["1", "2"]),
            article("2", "Bravo", 1, false, Some("2"), &["3"]),
            article("3", "Charlie", 5, true, Some("1"), &[]),
            article("4", "Delta", 2, true, Some("3"), &["4"]),
            article("5", "Echo", 4, true, None, &[]),
        ],
    );

    let comment = |id: &str, body: &str, author: &str| {
        Record::new(id)
            .attribute("body", json!(body))
            .has_one("author", Some(author))
    };
    store.extend(
        "comments",
        [
            comment("1", "Nice", "2"),
            comment("2", "Agreed", "1"),
            comment("3", "Hmm", "3"),
            comment("4", "Great", "2"),
        ],
    );

    store
}

/// Article schema: two per page, at most three.
pub fn article_schema<A: Adapter<Query = MemoryQuery, Model = Record>>() -> SchemaBuilder<A> {
    Schema::builder()
        .attribute(Attribute::new("title").sortable().filterable())
        .attribute(Attribute::new("rank").sortable())
        .attribute(Attribute::new("published").sortable().filterable())
        .has_one(Relationship::new("author", "people").filterable())
        .has_many(Relationship::new("comments", "comments").filterable())
        .sort("popular", |query: &mut MemoryQuery, direction, _| {
            query.order_by("rank", direction);
            Ok(())
        })
        .filter("search", |query: &mut MemoryQuery, value, _| {
            let needle = value.as_str().unwrap_or_default().to_lowercase();
            query.where_fn(move |record| {
                record
                    .get("title")
                    .and_then(Value::as_str)
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
            });
            Ok(())
        })
        .meta("constraints", |context: &Context<'_, MemoryQuery>| {
            json!(context.query().condition_count())
        })
        .per_page(Some(2))
        .limit(3)
}

pub fn people_schema<A: Adapter<Query = MemoryQuery, Model = Record>>() -> SchemaBuilder<A> {
    Schema::builder()
        .attribute(Attribute::new("name").sortable().filterable())
        .per_page(None)
}

pub fn comment_schema<A: Adapter<Query = MemoryQuery, Model = Record>>() -> SchemaBuilder<A> {
    Schema::builder()
        .attribute(Attribute::new("body"))
        .has_one(Relationship::new("author", "people").with_linkage())
}

/// Registers the blog types using `adapter` to create each type's adapter.
pub fn blog_api_with<A, F>(articles: SchemaBuilder<A>, adapter: F) -> JsonApi<A>
where
    A: Adapter<Query = MemoryQuery, Model = Record>,
    F: Fn(&str) -> A,
{
    JsonApi::new(BASE_URL)
        .resource(
            "articles",
            adapter("articles"),
            articles.build().expect("article schema"),
        )
        .resource(
            "people",
            adapter("people"),
            people_schema().build().expect("people schema"),
        )
        .resource(
            "comments",
            adapter("comments"),
            comment_schema().build().expect("comment schema"),
        )
}

/// The blog API over the in-memory adapter.
pub fn blog_api() -> JsonApi<MemoryAdapter> {
    blog_api_of(article_schema())
}

/// The blog API over the in-memory adapter with a customized article schema.
pub fn blog_api_of(articles: SchemaBuilder<MemoryAdapter>) -> JsonApi<MemoryAdapter> {
    let store = blog_store();
    blog_api_with(articles, |resource_type| {
        MemoryAdapter::new(Arc::clone(&store), resource_type)
    })
}

/// Lists `resource_type` with a query string such as `?sort=-title`.
pub fn list<A: Adapter>(api: &JsonApi<A>, resource_type: &str, query: &str) -> ApiResult<Document> {
    api.list(
        resource_type,
        ListRequest::new(format!("{}/{}{}", BASE_URL, resource_type, query)),
    )
}

/// Returns the ids of the primary resources.
pub fn ids(document: &Document) -> Vec<&str> {
    document.data.iter().map(|resource| resource.id.as_str()).collect()
}

/// Returns `type:id` keys of the included resources.
pub fn included_keys(document: &Document) -> Vec<String> {
    document
        .included
        .iter()
        .map(|resource| format!("{}:{}", resource.resource_type, resource.id))
        .collect()
}
