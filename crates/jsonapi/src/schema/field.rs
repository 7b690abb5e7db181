//! Schema fields: attributes and relationships.

use super::condition::Condition;
use crate::request::ListRequest;

/// A plain attribute of a resource.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    sortable: Condition,
    filterable: Condition,
}

impl Attribute {
    /// Creates an attribute that is neither sortable nor filterable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sortable: Condition::default(),
            filterable: Condition::default(),
        }
    }

    /// Allows sorting by this attribute.
    pub fn sortable(mut self) -> Self {
        self.sortable = Condition::Fixed(true);
        self
    }

    /// Allows sorting by this attribute when the predicate holds.
    pub fn sortable_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ListRequest) -> bool + Send + Sync + 'static,
    {
        self.sortable = Condition::when(predicate);
        self
    }

    /// Allows filtering by this attribute.
    pub fn filterable(mut self) -> Self {
        self.filterable = Condition::Fixed(true);
        self
    }

    /// Allows filtering by this attribute when the predicate holds.
    pub fn filterable_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ListRequest) -> bool + Send + Sync + 'static,
    {
        self.filterable = Condition::when(predicate);
        self
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the attribute may be sorted by in this request.
    pub fn is_sortable(&self, request: &ListRequest) -> bool {
        self.sortable.evaluate(request)
    }

    /// Returns whether the attribute may be filtered by in this request.
    pub fn is_filterable(&self, request: &ListRequest) -> bool {
        self.filterable.evaluate(request)
    }
}

/// A relationship to another resource type.
///
/// Used for both to-one and to-many relationships; the cardinality is carried
/// by the [`Field`] variant.
#[derive(Debug, Clone)]
pub struct Relationship {
    name: String,
    target_type: String,
    sortable: Condition,
    filterable: Condition,
    includable: bool,
    linkage: bool,
}

impl Relationship {
    /// Creates a relationship pointing at `target_type`.
    ///
    /// Relationships are includable by default and carry no linkage unless
    /// included.
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            sortable: Condition::default(),
            filterable: Condition::default(),
            includable: true,
            linkage: false,
        }
    }

    /// Marks the relationship sortable.
    ///
    /// Only named sort fields can act on it; the attribute sort fallback never
    /// dispatches a relationship.
    pub fn sortable(mut self) -> Self {
        self.sortable = Condition::Fixed(true);
        self
    }

    /// Marks the relationship sortable when the predicate holds.
    pub fn sortable_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ListRequest) -> bool + Send + Sync + 'static,
    {
        self.sortable = Condition::when(predicate);
        self
    }

    /// Allows filtering by related ids.
    pub fn filterable(mut self) -> Self {
        self.filterable = Condition::Fixed(true);
        self
    }

    /// Allows filtering by related ids when the predicate holds.
    pub fn filterable_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ListRequest) -> bool + Send + Sync + 'static,
    {
        self.filterable = Condition::when(predicate);
        self
    }

    /// Prevents the relationship from being named in `include`.
    pub fn not_includable(mut self) -> Self {
        self.includable = false;
        self
    }

    /// Always loads and emits resource linkage, even when not included.
    pub fn with_linkage(mut self) -> Self {
        self.linkage = true;
        self
    }

    /// Returns the relationship name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the related resource type.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Returns whether the relationship is marked sortable in this request.
    pub fn is_sortable(&self, request: &ListRequest) -> bool {
        self.sortable.evaluate(request)
    }

    /// Returns whether the relationship may be filtered by in this request.
    pub fn is_filterable(&self, request: &ListRequest) -> bool {
        self.filterable.evaluate(request)
    }

    /// Returns whether the relationship may appear in `include`.
    pub fn is_includable(&self) -> bool {
        self.includable
    }

    /// Returns whether linkage is always emitted.
    pub fn has_linkage(&self) -> bool {
        self.linkage
    }
}

/// A field declared on a resource schema.
#[derive(Debug, Clone)]
pub enum Field {
    /// A plain attribute.
    Attribute(Attribute),
    /// A to-one relationship.
    HasOne(Relationship),
    /// A to-many relationship.
    HasMany(Relationship),
}

impl Field {
    /// Returns the field name.
    pub fn name(&self) -> &str {
        match self {
            Field::Attribute(attribute) => attribute.name(),
            Field::HasOne(relationship) | Field::HasMany(relationship) => relationship.name(),
        }
    }

    /// Returns whether the field's sortable condition holds in this request.
    pub fn is_sortable(&self, request: &ListRequest) -> bool {
        match self {
            Field::Attribute(attribute) => attribute.is_sortable(request),
            Field::HasOne(relationship) | Field::HasMany(relationship) => {
                relationship.is_sortable(request)
            }
        }
    }

    /// Returns whether the field may be filtered by in this request.
    pub fn is_filterable(&self, request: &ListRequest) -> bool {
        match self {
            Field::Attribute(attribute) => attribute.is_filterable(request),
            Field::HasOne(relationship) | Field::HasMany(relationship) => {
                relationship.is_filterable(request)
            }
        }
    }

    /// Returns the attribute, if this field is one.
    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Field::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    /// Returns the relationship, if this field is one.
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Field::HasOne(relationship) | Field::HasMany(relationship) => Some(relationship),
            Field::Attribute(_) => None,
        }
    }
}

impl From<Attribute> for Field {
    fn from(attribute: Attribute) -> Self {
        Field::Attribute(attribute)
    }
}
