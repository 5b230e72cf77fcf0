//! Remote resource access.
//!
//! This module defines the collection endpoints the desk talks to and the
//! `ResourceClient` seam used by every controller. `http` is the production
//! implementation; `memory` keeps records in-process.

pub mod error;
pub mod http;
pub mod memory;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::controller::bucket::Bucket;
use crate::error::{DeskError, Result};
use crate::filter::DateRange;
use crate::types::{
    Certificate, Entity, EntityId, NewCertificate, NewReport, NewShip, Report, Ship,
};

pub use http::HttpClient;
pub use memory::MemoryClient;

/// Fixed page size used by every collection
pub const PAGE_SIZE: u32 = 50;

/// A remote collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Ships,
    Certificates,
    Reports,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Ships => "ships",
            Resource::Certificates => "certificates",
            Resource::Reports => "reports",
        }
    }

    pub fn list_path(self) -> &'static str {
        match self {
            Resource::Ships => "/api/ships/getAll",
            Resource::Certificates => "/api/certificates/getAll",
            Resource::Reports => "/api/reports/ultimosCreados",
        }
    }

    pub fn search_path(self) -> Option<&'static str> {
        match self {
            Resource::Ships => Some("/api/ships/search"),
            Resource::Certificates | Resource::Reports => None,
        }
    }

    pub fn create_path(self) -> &'static str {
        match self {
            Resource::Ships => "/api/ships/new",
            Resource::Certificates => "/api/certificates/new",
            Resource::Reports => "/api/reports/new",
        }
    }

    pub fn delete_path(self) -> Option<&'static str> {
        match self {
            Resource::Ships => Some("/api/ships/delete"),
            Resource::Reports => Some("/api/reports/delete"),
            Resource::Certificates => None,
        }
    }

    /// Key holding the records in list and search bodies
    pub fn collection_key(self) -> &'static str {
        self.name()
    }

    pub(crate) fn unsupported(self, operation: &'static str) -> DeskError {
        DeskError::Unsupported {
            resource: self.name(),
            operation,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Endpoint path for filtering reports by creation date
pub const REPORT_FILTER_PATH: &str = "/api/reports/getFilterReport";

/// Binds an entity type to its collection and create payload
pub trait RemoteEntity: Entity + DeserializeOwned + Serialize {
    const RESOURCE: Resource;

    /// Whether list views group this entity into recency buckets
    const BUCKETED: bool = false;

    type Draft: Serialize + Send + Sync + fmt::Debug;

    /// Decode a list body into records and the collection's total count
    fn decode_list(body: Value) -> Result<(Vec<Self>, u64)> {
        let total = read_total(&body);
        let items = decode_records(&body, Self::RESOURCE.collection_key())?;
        Ok((items, total))
    }
}

impl RemoteEntity for Ship {
    const RESOURCE: Resource = Resource::Ships;
    type Draft = NewShip;
}

impl RemoteEntity for Certificate {
    const RESOURCE: Resource = Resource::Certificates;
    type Draft = NewCertificate;
}

impl RemoteEntity for Report {
    const RESOURCE: Resource = Resource::Reports;
    const BUCKETED: bool = true;
    type Draft = NewReport;

    /// The reports listing arrives pre-grouped under `categorizedReports`;
    /// the groups are flattened in bucket order.
    fn decode_list(body: Value) -> Result<(Vec<Self>, u64)> {
        let total = read_total(&body);
        let Some(groups) = body.get("categorizedReports") else {
            let items = decode_records(&body, Self::RESOURCE.collection_key())?;
            return Ok((items, total));
        };

        let mut items = Vec::new();
        for bucket in Bucket::ALL {
            items.extend(decode_records::<Report>(groups, bucket.key())?);
        }
        Ok((items, total))
    }
}

/// Decode the array stored under `key`; a missing or null key is an empty list
pub(crate) fn decode_records<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Vec<T>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(records) => serde_json::from_value(records.clone()).map_err(|e| {
            DeskError::application(format!("unexpected '{key}' in server response: {e}"))
        }),
    }
}

fn read_total(body: &Value) -> u64 {
    body.get("total").and_then(Value::as_u64).unwrap_or(0)
}

/// Number of pages needed for `total` records
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

/// One fixed-size slice of a remote collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty(size: u32) -> Self {
        Self {
            items: Vec::new(),
            number: 1,
            size,
            total: 0,
        }
    }

    /// Build a page, holding `items.len() <= size` and `number >= 1`
    pub fn new(mut items: Vec<T>, number: u32, size: u32, total: u64) -> Self {
        if items.len() > size as usize {
            tracing::warn!(
                received = items.len(),
                page_size = size,
                "server returned more records than the page size, truncating"
            );
            items.truncate(size as usize);
        }
        Self {
            items,
            number: number.max(1),
            size,
            total,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.size)
    }

    /// Highest page number navigation may target
    pub fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }
}

/// Server acknowledgement of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: String,
}

/// Read/write access to the remote collections.
///
/// Every call either succeeds, fails with a transport failure (no response),
/// or fails with an application failure carrying the server's reason.
/// Implementations issue exactly one request per call and never retry.
pub trait ResourceClient: Send + Sync {
    /// Fetch one page of a collection
    fn list<T: RemoteEntity>(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<T>>> + Send;

    /// Look up records matching a free-text term
    fn search<T: RemoteEntity>(&self, query: &str)
    -> impl Future<Output = Result<Vec<T>>> + Send;

    /// Create a record
    fn create<T: RemoteEntity>(
        &self,
        draft: &T::Draft,
    ) -> impl Future<Output = Result<Ack>> + Send;

    /// Delete a record by id
    fn delete<T: RemoteEntity>(&self, id: &EntityId) -> impl Future<Output = Result<Ack>> + Send;

    /// Fetch every report created within a date range
    fn filter_reports(&self, range: &DateRange) -> impl Future<Output = Result<Vec<Report>>> + Send;
}
