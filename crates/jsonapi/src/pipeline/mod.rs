//! The listing pipeline.
//!
//! [`Index`] handles one "list resources" request for one resource type. It
//! runs a fixed sequence of phases against a single query object:
//!
//! 1. `listing` listeners (may rewrite the request)
//! 2. query creation
//! 3. `scope` listeners
//! 4. include parsing and validation
//! 5. pagination
//! 6. sort
//! 7. filter
//! 8. count (countable schemas only)
//! 9. fetch
//! 10. relationship loading
//! 11. `listed` listeners
//! 12. serialization and document assembly
//!
//! The order is part of the contract: scope always narrows before any
//! user-supplied parameter is applied, and pagination is bound before sort
//! and filter clauses are layered on. The first error aborts the request.

pub mod resolve;

pub use resolve::{
    FILTER_CHAIN, FilterTarget, Resolver, SORT_CHAIN, SortTarget, resolve_filter, resolve_sort,
};

use tracing::debug;

use crate::adapter::Adapter;
use crate::api::{JsonApi, ResourceType};
use crate::context::Context;
use crate::document::Document;
use crate::error::ApiResult;
use crate::include::{self, IncludeTree};
use crate::links::{LinkBuilder, LinkPolicy, PageWindow};
use crate::params::{self, Page, filter_scalar, split_list};
use crate::request::ListRequest;
use crate::serializer::{ResourceSerializer, Serializer};

/// Drives one listing request through the pipeline.
#[derive(Debug)]
pub struct Index<'a, A: Adapter> {
    api: &'a JsonApi<A>,
    resource: &'a ResourceType<A>,
}

impl<'a, A: Adapter> Index<'a, A> {
    /// Creates a handler for a registered resource type.
    pub fn new(api: &'a JsonApi<A>, resource: &'a ResourceType<A>) -> Self {
        Self { api, resource }
    }

    /// Runs the pipeline and assembles the listing document.
    pub fn handle(&self, mut request: ListRequest) -> ApiResult<Document> {
        let adapter = self.resource.adapter();
        let schema = self.resource.schema();
        let resource_type = self.resource.name();

        schema.listeners().run_listing(&mut request)?;
        debug!(resource_type = %resource_type, url = %request.url(), "Listing resources");

        let mut query = adapter.query();
        schema.listeners().run_scope(&mut query, &request)?;

        let include = self.include(&request)?;
        let page = self.paginate(&mut query, &request)?;
        self.sort(&mut query, &request)?;
        self.filter(&mut query, &request)?;

        let total = if schema.is_countable() {
            Some(adapter.count(&query)?)
        } else {
            None
        };

        let mut models = adapter.get(&query)?;
        debug!(
            resource_type = %resource_type,
            fetched = models.len(),
            total = ?total,
            "Fetched resources"
        );

        include::load_relationships(self.api, self.resource, &mut models, &include)?;
        schema.listeners().run_listed(&mut models, &request)?;

        let mut serializer = Serializer::new(self.api);
        for model in &models {
            serializer.add(self.resource, model, &include)?;
        }

        let links = LinkBuilder::new(&request);
        let window = PageWindow {
            offset: page.offset,
            limit: page.limit,
            count: models.len() as u64,
            total,
        };
        let policy = LinkPolicy {
            countable: schema.is_countable(),
            paginated: schema.per_page().is_some(),
        };

        let mut document = Document::builder(links.self_link())
            .pagination(links.pagination(&window, &policy))
            .data(serializer.primary())
            .included(serializer.included())
            .meta("offset", page.offset)
            .meta("limit", page.limit);
        if let Some(total) = total {
            document = document.meta("total", total);
        }

        let context = Context::new(&query, &request);
        for (key, value) in schema.document_meta(&context) {
            document = document.meta(key, value);
        }

        Ok(document.build())
    }

    fn include(&self, request: &ListRequest) -> ApiResult<IncludeTree> {
        let include = include::parse_include(request.params())?;
        include::validate_include(self.api, self.resource, &include)?;
        if !include.is_empty() {
            debug!(include = ?include.paths(), "Resolved include");
        }
        Ok(include)
    }

    fn paginate(&self, query: &mut A::Query, request: &ListRequest) -> ApiResult<Page> {
        let schema = self.resource.schema();
        let page = params::parse_pagination(request.params(), schema.per_page(), schema.limit())?;

        if page.is_bounded() {
            debug!(offset = page.offset, limit = ?page.limit, "Applying pagination");
            self.resource
                .adapter()
                .paginate(query, page.offset, page.limit)?;
        }
        Ok(page)
    }

    fn sort(&self, query: &mut A::Query, request: &ListRequest) -> ApiResult<()> {
        let schema = self.resource.schema();
        let Some(raw) = params::sort_param(request.params())?.or(schema.default_sort()) else {
            return Ok(());
        };

        for term in params::parse_sort(raw) {
            debug!(field = %term.field, direction = %term.direction, "Applying sort");
            match resolve_sort(schema, &term.field, request)? {
                SortTarget::Custom(sort_field) => sort_field.apply(query, term.direction, request)?,
                SortTarget::Attribute(attribute) => self
                    .resource
                    .adapter()
                    .sort_by_attribute(query, attribute, term.direction)?,
            }
        }
        Ok(())
    }

    fn filter(&self, query: &mut A::Query, request: &ListRequest) -> ApiResult<()> {
        let Some(filter) = params::parse_filter(request.params())? else {
            return Ok(());
        };

        let schema = self.resource.schema();
        let adapter = self.resource.adapter();

        for (name, value) in filter.iter() {
            let target = resolve_filter(schema, name, request)?;
            debug!(filter = %name, target = ?target, "Applying filter");

            match target {
                FilterTarget::Ids => {
                    let ids = split_list(filter_scalar(name, value)?);
                    adapter.filter_by_ids(query, &ids)?;
                }
                FilterTarget::Custom(custom) => custom.apply(query, value, request)?,
                FilterTarget::Attribute(attribute) => {
                    adapter.filter_by_attribute(query, attribute, filter_scalar(name, value)?)?;
                }
                FilterTarget::HasOne(relationship) => {
                    let ids = split_list(filter_scalar(name, value)?);
                    adapter.filter_by_has_one(query, relationship, &ids)?;
                }
                FilterTarget::HasMany(relationship) => {
                    let ids = split_list(filter_scalar(name, value)?);
                    adapter.filter_by_has_many(query, relationship, &ids)?;
                }
            }
        }
        Ok(())
    }
}
