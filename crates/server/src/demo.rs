//! Demo data set and schemas.

use std::sync::Arc;

use serde_json::{Value, json};
use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryStore, Record};
use tessera_jsonapi::schema::{Attribute, Relationship, Schema, SchemaBuilder};
use tessera_jsonapi::{JsonApi, ServerConfig};
use tracing::info;

/// Builds the blog API over a freshly seeded in-memory store.
pub fn blog_api(config: &ServerConfig) -> anyhow::Result<JsonApi<MemoryAdapter>> {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    info!(
        people = store.len("people"),
        articles = store.len("articles"),
        comments = store.len("comments"),
        "Seeded in-memory store"
    );

    let paged = |builder: SchemaBuilder<MemoryAdapter>| {
        builder.with_page_sizes(config.default_page_size, config.max_page_size)
    };

    let people = paged(
        Schema::<MemoryAdapter>::builder()
            .attribute(Attribute::new("name").sortable().filterable()),
    )
    .build()?;

    let articles = paged(
        Schema::<MemoryAdapter>::builder()
            .attribute(Attribute::new("title").sortable().filterable())
            .attribute(Attribute::new("body"))
            .attribute(Attribute::new("published").filterable())
            .attribute(Attribute::new("created").sortable())
            .has_one(Relationship::new("author", "people").filterable())
            .has_many(Relationship::new("comments", "comments").filterable())
            .filter("search", |query, value, _| {
                let needle = value.as_str().unwrap_or_default().to_lowercase();
                query.where_fn(move |record| {
                    record
                        .get("title")
                        .and_then(Value::as_str)
                        .is_some_and(|title| title.to_lowercase().contains(&needle))
                });
                Ok(())
            })
            .default_sort("-created"),
    )
    .build()?;

    let comments = paged(
        Schema::<MemoryAdapter>::builder()
            .attribute(Attribute::new("body"))
            .has_one(Relationship::new("author", "people").with_linkage().filterable()),
    )
    .build()?;

    Ok(JsonApi::new(config.base_url.as_str())
        .resource("people", MemoryAdapter::new(Arc::clone(&store), "people"), people)
        .resource("articles", MemoryAdapter::new(Arc::clone(&store), "articles"), articles)
        .resource("comments", MemoryAdapter::new(store, "comments"), comments))
}

fn seed(store: &MemoryStore) {
    store.extend(
        "people",
        [
            Record::new("1").attribute("name", json!("Ada Lovelace")),
            Record::new("2").attribute("name", json!("Grace Hopper")),
        ],
    );

    store.extend(
        "articles",
        [
            Record::new("1")
                .attribute("title", json!("Notes on the Analytical Engine"))
                .attribute("body", json!("The engine weaves algebraic patterns."))
                .attribute("published", json!(true))
                .attribute("created", json!("1843-09-01"))
                .has_one("author", Some("1"))
                .has_many("comments", ["1", "2"]),
            Record::new("2")
                .attribute("title", json!("Compiling for humans"))
                .attribute("body", json!("Programs should read like English."))
                .attribute("published", json!(true))
                .attribute("created", json!("1952-05-01"))
                .has_one("author", Some("2"))
                .has_many("comments", ["3"]),
            Record::new("3")
                .attribute("title", json!("Draft: nanoseconds"))
                .attribute("body", json!("A length of wire."))
                .attribute("published", json!(false))
                .attribute("created", json!("1985-01-01"))
                .has_one("author", Some("2"))
                .has_many("comments", std::iter::empty::<&str>()),
        ],
    );

    store.extend(
        "comments",
        [
            Record::new("1")
                .attribute("body", json!("Remarkable foresight."))
                .has_one("author", Some("2")),
            Record::new("2")
                .attribute("body", json!("Thank you."))
                .has_one("author", Some("1")),
            Record::new("3")
                .attribute("body", json!("Agreed."))
                .has_one("author", Some("1")),
        ],
    );
}
