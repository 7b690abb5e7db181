//! Resource serialization.
//!
//! Turns fetched models into JSON:API resource objects and collects the
//! related models reachable through the include tree into a compound
//! document's `included` set.
//!
//! Every resource is keyed by `(type, id)`. A resource reached more than once
//! is emitted once; relationships seen on later visits are merged into the
//! first copy. Resources that are part of the primary data never appear in
//! `included`.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::adapter::{Adapter, Related, ResourceModel};
use crate::api::{JsonApi, ResourceType};
use crate::error::ApiResult;
use crate::include::IncludeTree;
use crate::schema::Field;

/// A resource identifier object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id.
    pub id: String,
}

/// Relationship linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    /// To-one linkage; `null` when empty.
    One(Option<ResourceIdentifier>),
    /// To-many linkage.
    Many(Vec<ResourceIdentifier>),
}

/// A relationship object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipObject {
    /// Resource linkage.
    pub data: Linkage,
}

/// Links of a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLinks {
    /// Canonical URL of the resource.
    #[serde(rename = "self")]
    pub self_link: String,
}

/// A JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id.
    pub id: String,
    /// Attribute values in schema order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    /// Relationships that were included or always carry linkage.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, RelationshipObject>,
    /// Resource links.
    pub links: ResourceLinks,
}

impl ResourceObject {
    /// Returns the `(type, id)` key of this resource.
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
        }
    }
}

/// Collects primary and included resources for one document.
pub trait ResourceSerializer<A: Adapter> {
    /// Adds a primary model and, recursively, its included related models.
    fn add(
        &mut self,
        resource: &ResourceType<A>,
        model: &A::Model,
        include: &IncludeTree,
    ) -> ApiResult<()>;

    /// Returns the primary resources in the order they were added.
    fn primary(&self) -> Vec<ResourceObject>;

    /// Returns the included resources, unique by type and id and disjoint
    /// from the primary resources.
    fn included(&self) -> Vec<ResourceObject>;
}

/// The default [`ResourceSerializer`].
#[derive(Debug)]
pub struct Serializer<'a, A: Adapter> {
    api: &'a JsonApi<A>,
    resources: IndexMap<ResourceIdentifier, ResourceObject>,
    primary: IndexSet<ResourceIdentifier>,
}

impl<'a, A: Adapter> Serializer<'a, A> {
    /// Creates an empty serializer.
    pub fn new(api: &'a JsonApi<A>) -> Self {
        Self {
            api,
            resources: IndexMap::new(),
            primary: IndexSet::new(),
        }
    }

    fn serialize(
        &mut self,
        resource: &ResourceType<A>,
        model: &A::Model,
        include: &IncludeTree,
    ) -> ApiResult<ResourceIdentifier> {
        let key = ResourceIdentifier {
            resource_type: resource.name().to_string(),
            id: model.id(),
        };

        if !self.resources.contains_key(&key) {
            let attributes = resource
                .schema()
                .fields()
                .filter_map(Field::as_attribute)
                .map(|attribute| {
                    let value = model.attribute(attribute.name()).unwrap_or(Value::Null);
                    (attribute.name().to_string(), value)
                })
                .collect();

            let object = ResourceObject {
                resource_type: key.resource_type.clone(),
                id: key.id.clone(),
                attributes,
                relationships: IndexMap::new(),
                links: ResourceLinks {
                    self_link: format!("{}/{}/{}", self.api.base_url(), key.resource_type, key.id),
                },
            };
            self.resources.insert(key.clone(), object);
        }

        let mut relationships = IndexMap::new();

        for relationship in resource.schema().fields().filter_map(Field::as_relationship) {
            let nested = include.get(relationship.name());
            if nested.is_none() && !relationship.has_linkage() {
                continue;
            }

            let target = relationship.target_type();
            let identify = |related: &A::Model| ResourceIdentifier {
                resource_type: target.to_string(),
                id: related.id(),
            };

            let data = match model.related(relationship.name()) {
                Related::NotLoaded => continue,
                Related::One(related) => Linkage::One(related.map(identify)),
                Related::Many(related) => {
                    Linkage::Many(related.into_iter().map(identify).collect())
                }
            };
            relationships.insert(relationship.name().to_string(), RelationshipObject { data });

            let Some(nested) = nested else {
                continue;
            };
            let related_type = self.api.resource_type(target)?;
            match model.related(relationship.name()) {
                Related::One(Some(related)) => {
                    self.serialize(related_type, related, nested)?;
                }
                Related::Many(related) => {
                    for related in related {
                        self.serialize(related_type, related, nested)?;
                    }
                }
                Related::One(None) | Related::NotLoaded => {}
            }
        }

        if let Some(existing) = self.resources.get_mut(&key) {
            for (name, relationship) in relationships {
                existing.relationships.entry(name).or_insert(relationship);
            }
        }
        Ok(key)
    }
}

impl<A: Adapter> ResourceSerializer<A> for Serializer<'_, A> {
    fn add(
        &mut self,
        resource: &ResourceType<A>,
        model: &A::Model,
        include: &IncludeTree,
    ) -> ApiResult<()> {
        let key = self.serialize(resource, model, include)?;
        self.primary.insert(key);
        Ok(())
    }

    fn primary(&self) -> Vec<ResourceObject> {
        self.primary
            .iter()
            .filter_map(|key| self.resources.get(key).cloned())
            .collect()
    }

    fn included(&self) -> Vec<ResourceObject> {
        self.resources
            .iter()
            .filter(|(key, _)| !self.primary.contains(*key))
            .map(|(_, object)| object.clone())
            .collect()
    }
}
