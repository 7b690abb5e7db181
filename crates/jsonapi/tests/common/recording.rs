//! An adapter that records the calls it receives.

use std::sync::Arc;

use parking_lot::Mutex;
use tessera_jsonapi::adapter::memory::{MemoryAdapter, MemoryQuery, MemoryStore, Record};
use tessera_jsonapi::adapter::{Adapter, AdapterError, AdapterResult};
use tessera_jsonapi::params::SortDirection;
use tessera_jsonapi::schema::{Attribute, Relationship};

/// Shared, ordered call log.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Wraps [`MemoryAdapter`] and appends every call to a shared log.
///
/// When `fail_on` names a call, that call fails instead of being forwarded.
#[derive(Debug, Clone)]
pub struct RecordingAdapter {
    inner: MemoryAdapter,
    log: CallLog,
    fail_on: Option<&'static str>,
}

impl RecordingAdapter {
    pub fn new(store: Arc<MemoryStore>, resource_type: &str, log: CallLog) -> Self {
        Self {
            inner: MemoryAdapter::new(store, resource_type),
            log,
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    fn record(&self, call: &'static str, detail: Option<String>) -> AdapterResult<()> {
        let entry = match detail {
            Some(detail) => format!("{}:{}", call, detail),
            None => call.to_string(),
        };
        self.log.lock().push(entry);

        if self.fail_on == Some(call) {
            return Err(AdapterError::new(format!("{} failed", call)));
        }
        Ok(())
    }
}

/// Creates an empty call log.
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Returns a snapshot of the log.
pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

impl Adapter for RecordingAdapter {
    type Query = MemoryQuery;
    type Model = Record;

    fn query(&self) -> MemoryQuery {
        // Infallible, so never a failure point.
        self.log.lock().push("query".to_string());
        self.inner.query()
    }

    fn paginate(
        &self,
        query: &mut MemoryQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> AdapterResult<()> {
        self.record("paginate", Some(format!("{}/{:?}", offset, limit)))?;
        self.inner.paginate(query, offset, limit)
    }

    fn sort_by_attribute(
        &self,
        query: &mut MemoryQuery,
        attribute: &Attribute,
        direction: SortDirection,
    ) -> AdapterResult<()> {
        self.record("sort", Some(format!("{} {}", attribute.name(), direction)))?;
        self.inner.sort_by_attribute(query, attribute, direction)
    }

    fn filter_by_ids(&self, query: &mut MemoryQuery, ids: &[String]) -> AdapterResult<()> {
        self.record("filter_ids", Some(ids.join(",")))?;
        self.inner.filter_by_ids(query, ids)
    }

    fn filter_by_attribute(
        &self,
        query: &mut MemoryQuery,
        attribute: &Attribute,
        value: &str,
    ) -> AdapterResult<()> {
        self.record("filter", Some(format!("{}={}", attribute.name(), value)))?;
        self.inner.filter_by_attribute(query, attribute, value)
    }

    fn filter_by_has_one(
        &self,
        query: &mut MemoryQuery,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()> {
        self.record("filter_has_one", Some(relationship.name().to_string()))?;
        self.inner.filter_by_has_one(query, relationship, ids)
    }

    fn filter_by_has_many(
        &self,
        query: &mut MemoryQuery,
        relationship: &Relationship,
        ids: &[String],
    ) -> AdapterResult<()> {
        self.record("filter_has_many", Some(relationship.name().to_string()))?;
        self.inner.filter_by_has_many(query, relationship, ids)
    }

    fn count(&self, query: &MemoryQuery) -> AdapterResult<u64> {
        self.record("count", None)?;
        self.inner.count(query)
    }

    fn get(&self, query: &MemoryQuery) -> AdapterResult<Vec<Record>> {
        self.record("get", None)?;
        self.inner.get(query)
    }

    fn load(
        &self,
        models: &mut [Record],
        path: &[&Relationship],
        linkage_only: bool,
    ) -> AdapterResult<()> {
        let path_name = path
            .iter()
            .map(|relationship| relationship.name())
            .collect::<Vec<_>>()
            .join(".");
        let detail = if linkage_only {
            format!("{} (linkage)", path_name)
        } else {
            path_name
        };
        self.record("load", Some(detail))?;
        self.inner.load(models, path, linkage_only)
    }
}
