//! In-process [`ResourceClient`] that keeps records as JSON values.
//!
//! Records are stored in insertion order per collection and decoded on the
//! way out, so the same entity types and drafts flow through it as through
//! the HTTP client. Every call is recorded, and a failure can be queued for
//! the next call, which makes it the backbone of the controller tests.

use std::collections::{HashMap, VecDeque};

use jiff::Timestamp;
use jiff::tz::TimeZone;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DeskError, Failure, Result};
use crate::filter::DateRange;
use crate::types::{Entity, EntityId, Report};

use super::{Ack, Page, RemoteEntity, Resource, ResourceClient};

/// A call observed by the memory client
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        resource: Resource,
        page: u32,
        page_size: u32,
    },
    Search {
        resource: Resource,
        query: String,
    },
    Create {
        resource: Resource,
        payload: Value,
    },
    Delete {
        resource: Resource,
        id: EntityId,
    },
    FilterReports {
        range: DateRange,
    },
}

impl Call {
    pub fn resource(&self) -> Resource {
        match self {
            Call::List { resource, .. }
            | Call::Search { resource, .. }
            | Call::Create { resource, .. }
            | Call::Delete { resource, .. } => *resource,
            Call::FilterReports { .. } => Resource::Reports,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<Resource, Vec<Value>>,
    calls: Vec<Call>,
    failures: VecDeque<Failure>,
    next_id: u64,
}

/// Records kept in memory, behind a mutex
pub struct MemoryClient {
    state: Mutex<MemoryState>,
    now: Timestamp,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                ..Default::default()
            }),
            now: Timestamp::now(),
        }
    }

    /// Stamp created records with a fixed instant
    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = now;
        self
    }

    /// Append records to a collection
    pub fn seed<S: Serialize>(&self, resource: Resource, records: &[S]) -> Result<()> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.state
            .lock()
            .records
            .entry(resource)
            .or_default()
            .extend(values);
        Ok(())
    }

    /// Make the next call fail with the given failure, without touching records
    pub fn fail_next(&self, failure: Failure) {
        self.state.lock().failures.push_back(failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn list_calls(&self, resource: Resource) -> usize {
        self.count(|c| matches!(c, Call::List { resource: r, .. } if *r == resource))
    }

    pub fn search_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Search { .. }))
    }

    pub fn delete_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Delete { .. }))
    }

    pub fn create_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Create { .. }))
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn len(&self, resource: Resource) -> usize {
        self.state
            .lock()
            .records
            .get(&resource)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, resource: Resource) -> bool {
        self.len(resource) == 0
    }

    /// Record the call and pop a queued failure, if any
    fn enter(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(failure) => Err(DeskError::from(failure)),
            None => Ok(()),
        }
    }

    fn decode_all<T: RemoteEntity>(values: &[Value]) -> Result<Vec<T>> {
        values
            .iter()
            .map(|v| serde_json::from_value(v.clone()).map_err(DeskError::from))
            .collect()
    }
}

fn text_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn id_matches(value: &Value, id: &EntityId) -> bool {
    match value.get("id") {
        Some(Value::String(s)) => s == id.as_str(),
        Some(Value::Number(n)) => n.to_string() == id.as_str(),
        _ => false,
    }
}

impl ResourceClient for MemoryClient {
    async fn list<T: RemoteEntity>(&self, page: u32, page_size: u32) -> Result<Page<T>> {
        self.enter(Call::List {
            resource: T::RESOURCE,
            page,
            page_size,
        })?;

        let (slice, total) = {
            let state = self.state.lock();
            let records = state
                .records
                .get(&T::RESOURCE)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
            let slice: Vec<Value> = records
                .iter()
                .skip(start)
                .take(page_size as usize)
                .cloned()
                .collect();
            (slice, records.len() as u64)
        };

        let items = Self::decode_all(&slice)?;
        Ok(Page::new(items, page, page_size, total))
    }

    async fn search<T: RemoteEntity>(&self, query: &str) -> Result<Vec<T>> {
        let resource = T::RESOURCE;
        if resource.search_path().is_none() {
            return Err(resource.unsupported("search"));
        }
        self.enter(Call::Search {
            resource,
            query: query.to_string(),
        })?;

        let needle = query.to_lowercase();
        let matches: Vec<Value> = {
            let state = self.state.lock();
            state
                .records
                .get(&resource)
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .filter(|v| {
                    text_field(v, "name").to_lowercase().contains(&needle)
                        || text_field(v, "imo").to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        };
        Self::decode_all(&matches)
    }

    async fn create<T: RemoteEntity>(&self, draft: &T::Draft) -> Result<Ack> {
        let payload = serde_json::to_value(draft)?;
        self.enter(Call::Create {
            resource: T::RESOURCE,
            payload: payload.clone(),
        })?;

        let mut record = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        record.insert("id".to_string(), Value::String(format!("m{id}")));
        record.insert("createdAt".to_string(), Value::String(self.now.to_string()));
        state
            .records
            .entry(T::RESOURCE)
            .or_default()
            .push(Value::Object(record));

        Ok(Ack {
            message: format!("{} record created", T::RESOURCE),
        })
    }

    async fn delete<T: RemoteEntity>(&self, id: &EntityId) -> Result<Ack> {
        let resource = T::RESOURCE;
        if resource.delete_path().is_none() {
            return Err(resource.unsupported("delete"));
        }
        self.enter(Call::Delete {
            resource,
            id: id.clone(),
        })?;

        let mut state = self.state.lock();
        let records = state.records.entry(resource).or_default();
        let before = records.len();
        records.retain(|v| !id_matches(v, id));
        if records.len() == before {
            return Err(DeskError::Application {
                status: Some(404),
                reason: format!("{resource} record '{id}' not found"),
            });
        }
        Ok(Ack {
            message: format!("{resource} record deleted"),
        })
    }

    async fn filter_reports(&self, range: &DateRange) -> Result<Vec<Report>> {
        self.enter(Call::FilterReports {
            range: *range,
        })?;

        let values = self
            .state
            .lock()
            .records
            .get(&Resource::Reports)
            .cloned()
            .unwrap_or_default();
        let reports: Vec<Report> = Self::decode_all(&values)?;
        Ok(reports
            .into_iter()
            .filter(|r| {
                r.created_at()
                    .map(|ts| range.contains(ts.to_zoned(TimeZone::UTC).date()))
                    .unwrap_or(false)
            })
            .collect())
    }
}
