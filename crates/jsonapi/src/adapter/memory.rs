//! In-memory adapter.
//!
//! Stores records per resource type in a shared [`MemoryStore`] and evaluates
//! queries by scanning. Intended for tests, demos and small fixed data sets.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryStore, Record};
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert("people", Record::new("1").attribute("name", json!("Ada")));
//!
//! let adapter = MemoryAdapter::new(store, "people");
//! assert_eq!(adapter.resource_type(), "people");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use super::{Adapter, AdapterResult, Related, ResourceModel};
use crate::params::SortDirection;
use crate::schema::{Attribute, Relationship};

/// Stored relationship linkage of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// To-one linkage.
    One(Option<String>),
    /// To-many linkage.
    Many(Vec<String>),
}

#[derive(Debug, Clone)]
enum Loaded {
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

#[derive(Debug, Clone)]
struct LoadedRelationship {
    models: Loaded,
    linkage_only: bool,
}

/// A stored resource.
#[derive(Debug, Clone)]
pub struct Record {
    id: String,
    attributes: IndexMap<String, Value>,
    relationships: IndexMap<String, Linkage>,
    loaded: IndexMap<String, LoadedRelationship>,
}

impl Record {
    /// Creates a record with no attributes or relationships.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
            loaded: IndexMap::new(),
        }
    }

    /// Sets an attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Sets to-one linkage.
    pub fn has_one(mut self, name: impl Into<String>, id: Option<&str>) -> Self {
        self.relationships
            .insert(name.into(), Linkage::One(id.map(str::to_string)));
        self
    }

    /// Sets to-many linkage.
    pub fn has_many<I, S>(mut self, name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships.insert(
            name.into(),
            Linkage::Many(ids.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Returns the stored linkage for a relationship.
    pub fn linkage(&self, name: &str) -> Option<&Linkage> {
        self.relationships.get(name)
    }

    /// Returns whether a relationship has been loaded, and if so whether only
    /// its linkage was requested.
    pub fn loaded(&self, name: &str) -> Option<bool> {
        self.loaded.get(name).map(|loaded| loaded.linkage_only)
    }

    /// Returns the stored attribute value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets an attribute on an existing record.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    fn stored(&self) -> Record {
        Record {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            relationships: self.relationships.clone(),
            loaded: IndexMap::new(),
        }
    }

    fn loaded_children_mut(&mut self, name: &str) -> Vec<&mut Record> {
        match self.loaded.get_mut(name).map(|loaded| &mut loaded.models) {
            Some(Loaded::One(Some(record))) => vec![record.as_mut()],
            Some(Loaded::Many(records)) => records.iter_mut().collect(),
            Some(Loaded::One(None)) | None => Vec::new(),
        }
    }
}

impl ResourceModel for Record {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn related(&self, name: &str) -> Related<'_, Self> {
        match self.loaded.get(name).map(|loaded| &loaded.models) {
            Some(Loaded::One(record)) => Related::One(record.as_deref()),
            Some(Loaded::Many(records)) => Related::Many(records.iter().collect()),
            None => Related::NotLoaded,
        }
    }
}

/// Shared record storage keyed by resource type.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<IndexMap<String, Vec<Record>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any record with the same id.
    pub fn insert(&self, resource_type: &str, record: Record) {
        let mut collections = self.collections.write();
        let records = collections.entry(resource_type.to_string()).or_default();
        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Inserts many records.
    pub fn extend<I>(&self, resource_type: &str, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.insert(resource_type, record);
        }
    }

    /// Returns the number of records of a type.
    pub fn len(&self, resource_type: &str) -> usize {
        self.collections
            .read()
            .get(resource_type)
            .map_or(0, Vec::len)
    }

    /// Returns true when no records of a type are stored.
    pub fn is_empty(&self, resource_type: &str) -> bool {
        self.len(resource_type) == 0
    }

    fn find(&self, resource_type: &str, id: &str) -> Option<Record> {
        self.collections
            .read()
            .get(resource_type)?
            .iter()
            .find(|record| record.id == id)
            .map(Record::stored)
    }
}

type Predicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// A single constraint of a [`MemoryQuery`].
#[derive(Clone)]
pub enum Constraint {
    /// Record id is one of the listed ids.
    Ids(Vec<String>),
    /// Attribute, rendered as a string, equals the value.
    Attribute {
        /// Attribute name.
        name: String,
        /// Expected value.
        value: String,
    },
    /// To-one linkage points at one of the ids.
    HasOne {
        /// Relationship name.
        name: String,
        /// Accepted related ids.
        ids: Vec<String>,
    },
    /// To-many linkage contains any of the ids.
    HasMany {
        /// Relationship name.
        name: String,
        /// Accepted related ids.
        ids: Vec<String>,
    },
    /// Arbitrary predicate added by schema callbacks.
    Custom(Predicate),
}

impl Constraint {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Constraint::Ids(ids) => ids.contains(&record.id),
            Constraint::Attribute { name, value } => record
                .attributes
                .get(name)
                .is_some_and(|attribute| value_to_string(attribute) == *value),
            Constraint::HasOne { name, ids } => matches!(
                record.relationships.get(name),
                Some(Linkage::One(Some(id))) if ids.contains(id)
            ),
            Constraint::HasMany { name, ids } => match record.relationships.get(name) {
                Some(Linkage::Many(linked)) => linked.iter().any(|id| ids.contains(id)),
                _ => false,
            },
            Constraint::Custom(predicate) => predicate(record),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Ids(ids) => f.debug_tuple("Ids").field(ids).finish(),
            Constraint::Attribute { name, value } => f
                .debug_struct("Attribute")
                .field("name", name)
                .field("value", value)
                .finish(),
            Constraint::HasOne { name, ids } => f
                .debug_struct("HasOne")
                .field("name", name)
                .field("ids", ids)
                .finish(),
            Constraint::HasMany { name, ids } => f
                .debug_struct("HasMany")
                .field("name", name)
                .field("ids", ids)
                .finish(),
            Constraint::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Accumulated constraints for one listing.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    constraints: Vec<Constraint>,
    sort: Vec<(String, SortDirection)>,
    offset: u64,
    limit: Option<u64>,
}

impl MemoryQuery {
    /// Adds a constraint.
    pub fn constrain(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Adds a predicate constraint.
    pub fn where_fn<F>(&mut self, predicate: F)
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(Constraint::Custom(Arc::new(predicate)));
    }

    /// Appends a sort key on an attribute.
    pub fn order_by(&mut self, attribute: impl Into<String>, direction: SortDirection) {
        self.sort.push((attribute.into(), direction));
    }

    /// Returns the number of constraints.
    pub fn condition_count(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the sort keys in order.
    pub fn sort_keys(&self) -> &[(String, SortDirection)] {
        &self.sort
    }

    /// Returns the pagination window.
    pub fn window(&self) -> (u64, Option<u64>) {
        (self.offset, self.limit)
    }

    fn matches(&self, record: &Record) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.matches(record))
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for (name, direction) in &self.sort {
            let ordering = compare_values(a.attributes.get(name), b.attributes.get(name));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Adapter over one resource type of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    store: Arc<MemoryStore>,
    resource_type: String,
}

impl MemoryAdapter {
    /// Creates an adapter for `resource_type`.
    pub fn new(store: Arc<MemoryStore>, resource_type: impl Into<String>) -> Self {
        Self {
            store,
            resource_type: resource_type.into(),
        }
    }

    /// Returns the resource type served by this adapter.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn matching(&self, query: &MemoryQuery) -> Vec<Record> {
        let collections = self.store.collections.read();
        let mut records: Vec<Record> = collections
            .get(&self.resource_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| query.matches(record))
                    .map(Record::stored)
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by(|a, b| query.compare(a, b));
        records
    }

    fn resolve(&self, relationship: &Relationship, id: &str, linkage_only: bool) -> Option<Record> {
        if linkage_only {
            return Some(Record::new(id));
        }
        self.store.find(relationship.target_type(), id)
    }

    fn load_onto(&self, record: &mut Record, relationship: &Relationship, linkage_only: bool) {
        let name = relationship.name();
        if linkage_only && record.loaded.contains_key(name) {
            return;
        }

        let models = match record.relationships.get(name) {
            Some(Linkage::One(id)) => Loaded::One(
                id.as_deref()
                    .and_then(|id| self.resolve(relationship, id, linkage_only))
                    .map(Box::new),
            ),
            Some(Linkage::Many(ids)) => Loaded::Many(
                ids.iter()
                    .filter_map(|id| self.resolve(relationship, id, linkage_only))
                    .collect(),
            ),
            None => Loaded::Many(Vec::new()),
        };

        record.loaded.insert(
            name.to_string(),
            LoadedRelationship {
                models,
                linkage_only,
            },
        );
    }
}

impl Adapter for MemoryAdapter {
    type Query = MemoryQuery;
    type Model = Record;

    fn query(&self) -> MemoryQuery {
        MemoryQuery::default()
    }

    fn paginate(
        &self,
        query: &mut MemoryQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> AdapterResult<()> {
        query.offset = offset;
        query.limit = limit;
        Ok(())
    }

    fn sort_by_attribute(
        &self,
        query: &mut MemoryQuery,
        attribute: &Attribute,
        direction: SortDirection,
    ) -> AdapterResult<()> {
        query.order_by(attribute.name(), direction);
        Ok(())
    }

    fn filter_by_ids(&self, query: &mut MemoryQuery, ids: &[String]) -> AdapterResult<()> {
        query.constrain(Constraint::Ids(ids.to_vec()));
        Ok(())
    }

    fn filter_by_attribute(
        &self,
        query: &mut MemoryQuery,
        attribute: &Attribute,
        value: &str,
    ) -> AdapterResult<()> {
        query.constrain(Constraint::Attribute {
            name: attribute.name().to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn filter_by_has_one(
        &self,
        query: &mut MemoryQuery,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()> {
        query.constrain(Constraint::HasOne {
            name: relationship.name().to_string(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    fn filter_by_has_many(
        &self,
        query: &mut MemoryQuery,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()> {
        query.constrain(Constraint::HasMany {
            name: relationship.name().to_string(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    fn count(&self, query: &MemoryQuery) -> AdapterResult<u64> {
        Ok(self.matching(query).len() as u64)
    }

    fn get(&self, query: &MemoryQuery) -> AdapterResult<Vec<Record>> {
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(self
            .matching(query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn load(
        &self,
        models: &mut [Record],
        path: &[&Relationship],
        linkage_only: bool,
    ) -> AdapterResult<()> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };

        let mut targets: Vec<&mut Record> = models.iter_mut().collect();
        for relationship in parents {
            targets = targets
                .into_iter()
                .flat_map(|record| record.loaded_children_mut(relationship.name()))
                .collect();
        }

        for record in targets {
            self.load_onto(record, last, linkage_only);
        }
        Ok(())
    }
}

/// Renders an attribute the way it is compared against filter values.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Orders attribute values; missing and null sort first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => value_to_string(a).cmp(&value_to_string(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.extend(
            "people",
            [
                Record::new("1").attribute("name", json!("Ada")),
                Record::new("2").attribute("name", json!("Grace")),
            ],
        );
        store.extend(
            "articles",
            [
                Record::new("1")
                    .attribute("title", json!("B"))
                    .attribute("rank", json!(2))
                    .has_one("author", Some("1"))
                    .has_many("tags", ["x", "y"]),
                Record::new("2")
                    .attribute("title", json!("A"))
                    .attribute("rank", json!(10))
                    .has_one("author", Some("2"))
                    .has_many("tags", ["y"]),
                Record::new("3")
                    .attribute("title", json!("C"))
                    .has_one("author", None)
                    .has_many("tags", Vec::<String>::new()),
            ],
        );
        store
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().map(ResourceModel::id).collect()
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let store = MemoryStore::new();
        store.insert("people", Record::new("1").attribute("name", json!("A")));
        store.insert("people", Record::new("1").attribute("name", json!("B")));
        assert_eq!(store.len("people"), 1);
        assert!(store.is_empty("articles"));
    }

    #[test]
    fn test_sort_numeric_and_desc() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut query = adapter.query();
        adapter
            .sort_by_attribute(&mut query, &Attribute::new("rank"), SortDirection::Desc)
            .unwrap();
        // missing rank sorts first ascending, so last when descending
        assert_eq!(ids(&adapter.get(&query).unwrap()), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filters_combine() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut query = adapter.query();
        adapter
            .filter_by_has_many(&mut query, &Relationship::new("tags", "tags"), &["y".to_string()])
            .unwrap();
        adapter
            .filter_by_has_one(
                &mut query,
                &Relationship::new("author", "people"),
                &["2".to_string()],
            )
            .unwrap();
        assert_eq!(ids(&adapter.get(&query).unwrap()), vec!["2"]);
        assert_eq!(query.condition_count(), 2);
    }

    #[test]
    fn test_attribute_filter_compares_rendered_value() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut query = adapter.query();
        adapter
            .filter_by_attribute(&mut query, &Attribute::new("rank"), "10")
            .unwrap();
        assert_eq!(ids(&adapter.get(&query).unwrap()), vec!["2"]);
    }

    #[test]
    fn test_count_ignores_pagination() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut query = adapter.query();
        adapter.paginate(&mut query, 1, Some(1)).unwrap();
        assert_eq!(adapter.count(&query).unwrap(), 3);
        assert_eq!(ids(&adapter.get(&query).unwrap()), vec!["2"]);
        assert_eq!(query.window(), (1, Some(1)));
    }

    #[test]
    fn test_custom_predicate() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut query = adapter.query();
        query.where_fn(|record| record.get("title") != Some(&json!("A")));
        assert_eq!(ids(&adapter.get(&query).unwrap()), vec!["1", "3"]);
    }

    #[test]
    fn test_load_nested_path() {
        let store = seeded();
        store.insert(
            "people",
            Record::new("1")
                .attribute("name", json!("Ada"))
                .has_many("articles", ["1", "2"]),
        );
        let adapter = MemoryAdapter::new(store, "articles");
        let mut models = adapter.get(&adapter.query()).unwrap();

        let author = Relationship::new("author", "people");
        let articles = Relationship::new("articles", "articles");
        adapter.load(&mut models, &[&author], false).unwrap();
        adapter.load(&mut models, &[&author, &articles], true).unwrap();

        let Related::One(Some(ada)) = models[0].related("author") else {
            panic!("author not loaded");
        };
        assert_eq!(ada.attribute("name"), Some(json!("Ada")));
        let Related::Many(linked) = ada.related("articles") else {
            panic!("articles not loaded");
        };
        assert_eq!(ids(&linked.into_iter().cloned().collect::<Vec<_>>()), vec!["1", "2"]);
        assert_eq!(ada.loaded("articles"), Some(true));

        assert!(matches!(models[2].related("author"), Related::One(None)));
        assert!(matches!(models[0].related("tags"), Related::NotLoaded));
    }

    #[test]
    fn test_linkage_load_does_not_downgrade_full_load() {
        let adapter = MemoryAdapter::new(seeded(), "articles");
        let mut models = adapter.get(&adapter.query()).unwrap();
        let author = Relationship::new("author", "people");

        adapter.load(&mut models, &[&author], false).unwrap();
        adapter.load(&mut models, &[&author], true).unwrap();
        assert_eq!(models[0].loaded("author"), Some(false));
    }
}
