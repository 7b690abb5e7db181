//! Relationship inclusion.
//!
//! Parses the `include` parameter into an [`IncludeTree`], validates it
//! against the schemas of the resource graph and loads the requested
//! relationships onto fetched models level by level.

use indexmap::IndexMap;

use crate::adapter::Adapter;
use crate::api::{JsonApi, ResourceType};
use crate::error::{ApiError, ApiResult};
use crate::params::{ParamValue, QueryParams};
use crate::schema::{Field, Relationship};

/// Ordered tree of relationship names to include.
///
/// `author,comments.author` parses to:
///
/// ```text
/// author
/// comments
/// └── author
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree(IndexMap<String, IncludeTree>);

impl IncludeTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of dotted paths.
    pub fn parse(raw: &str) -> Self {
        let mut tree = Self::new();
        tree.extend_paths(raw);
        tree
    }

    fn extend_paths(&mut self, raw: &str) {
        for path in raw.split(',') {
            self.insert_path(path);
        }
    }

    /// Adds one dotted path.
    pub fn insert_path(&mut self, path: &str) {
        let mut node = self;
        for name in path.split('.') {
            node = node.0.entry(name.to_string()).or_default();
        }
    }

    /// Returns the subtree for a relationship, if it is included.
    pub fn get(&self, name: &str) -> Option<&IncludeTree> {
        self.0.get(name)
    }

    /// Returns whether a relationship is included at this level.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over the included relationships at this level.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IncludeTree)> {
        self.0.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    /// Returns true when nothing is included.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns every path in the tree in dotted form, parents first.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for (name, nested) in &self.0 {
            let path = format!("{}{}", prefix, name);
            paths.push(path.clone());
            nested.collect_paths(&format!("{}.", path), paths);
        }
    }
}

/// Reads the `include` parameter.
///
/// Accepts `include=a,b.c` as well as the list form `include[]=a&include[]=b.c`.
pub fn parse_include(params: &QueryParams) -> ApiResult<IncludeTree> {
    let mut tree = IncludeTree::new();

    match params.get("include") {
        None | Some(ParamValue::Null) => {}
        Some(ParamValue::String(raw)) => {
            if !raw.is_empty() {
                tree.extend_paths(raw);
            }
        }
        Some(ParamValue::Map(items)) => {
            for (_, item) in items.iter() {
                match item {
                    ParamValue::String(path) => tree.insert_path(path),
                    ParamValue::Null => {}
                    ParamValue::Map(_) => {
                        return Err(ApiError::invalid_parameter(
                            "include",
                            "include must be a string",
                        ));
                    }
                }
            }
        }
    }

    Ok(tree)
}

/// Checks that every name in `include` is an includable relationship of the
/// type it is applied to, and that its target type is registered.
pub fn validate_include<A: Adapter>(
    api: &JsonApi<A>,
    resource: &ResourceType<A>,
    include: &IncludeTree,
) -> ApiResult<()> {
    validate_level(api, resource, include, "")
}

fn validate_level<A: Adapter>(
    api: &JsonApi<A>,
    resource: &ResourceType<A>,
    include: &IncludeTree,
    prefix: &str,
) -> ApiResult<()> {
    for (name, nested) in include.iter() {
        let path = format!("{}{}", prefix, name);
        let invalid = || ApiError::InvalidInclude { path: path.clone() };

        let relationship = resource
            .schema()
            .relationship(name)
            .filter(|relationship| relationship.is_includable())
            .ok_or_else(invalid)?;
        let related = api
            .resource_type(relationship.target_type())
            .map_err(|_| invalid())?;

        validate_level(api, related, nested, &format!("{}.", path))?;
    }
    Ok(())
}

/// Loads included and always-linked relationships onto `models`.
///
/// At each level every relationship that is included or always carries
/// linkage is loaded through that level's adapter, with the full path from
/// the primary models. Included relationships are then descended into.
pub fn load_relationships<A: Adapter>(
    api: &JsonApi<A>,
    resource: &ResourceType<A>,
    models: &mut [A::Model],
    include: &IncludeTree,
) -> ApiResult<()> {
    load_level(api, resource, models, include, &[])
}

fn load_level<A: Adapter>(
    api: &JsonApi<A>,
    resource: &ResourceType<A>,
    models: &mut [A::Model],
    include: &IncludeTree,
    parents: &[&Relationship],
) -> ApiResult<()> {
    for field in resource.schema().fields() {
        let relationship = match field {
            Field::HasOne(relationship) | Field::HasMany(relationship) => relationship,
            Field::Attribute(_) => continue,
        };

        let nested = include.get(relationship.name());
        if nested.is_none() && !relationship.has_linkage() {
            continue;
        }

        let mut path = parents.to_vec();
        path.push(relationship);

        tracing::debug!(
            resource_type = %resource.name(),
            relationship = %relationship.name(),
            depth = path.len(),
            linkage_only = nested.is_none(),
            "Loading relationship"
        );
        resource.adapter().load(models, &path, nested.is_none())?;

        if let Some(nested) = nested {
            let related = api.resource_type(relationship.target_type())?;
            load_level(api, related, models, nested, &path)?;
        }
    }
    Ok(())
}
