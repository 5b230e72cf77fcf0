//! Paginated collection store.
//!
//! Holds the currently loaded page of one remote collection. Each load is
//! stamped with a monotonically increasing sequence number; a response is
//! applied only if its sequence number is still the latest issued, so a slow
//! earlier load can never overwrite a faster later one.

use tracing::{debug, warn};

use crate::error::{DeskError, Failure, Result};
use crate::remote::{PAGE_SIZE, Page, RemoteEntity, ResourceClient};

/// Handle for one issued load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    page: u32,
}

impl LoadTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// What happened to a finished load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was the latest and is now the current page
    Applied,
    /// A newer load was issued meanwhile; the response was dropped
    Superseded,
}

#[derive(Debug)]
pub struct PaginatedStore<T> {
    page: Option<Page<T>>,
    page_size: u32,
    issued: u64,
    in_flight: Option<u64>,
    last_error: Option<Failure>,
}

impl<T> Default for PaginatedStore<T> {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl<T> PaginatedStore<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: None,
            page_size: page_size.max(1),
            issued: 0,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn page(&self) -> Option<&Page<T>> {
        self.page.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.page.as_ref().map_or(&[], |p| p.items.as_slice())
    }

    /// Page currently displayed, 1 before anything was loaded
    pub fn current_page(&self) -> u32 {
        self.page.as_ref().map_or(1, |p| p.number)
    }

    pub fn total(&self) -> u64 {
        self.page.as_ref().map_or(0, |p| p.total)
    }

    pub fn total_pages(&self) -> u32 {
        self.page.as_ref().map_or(0, Page::total_pages)
    }

    /// Highest page `go_to` accepts
    pub fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Failure of the most recent applied load, cleared by the next success
    pub fn last_error(&self) -> Option<&Failure> {
        self.last_error.as_ref()
    }

    /// Issue a new load, superseding any load still in flight
    pub fn begin_load(&mut self, page: u32) -> Result<LoadTicket> {
        if page == 0 {
            return Err(DeskError::Validation("page numbers start at 1".to_string()));
        }
        self.issued += 1;
        if let Some(previous) = self.in_flight.replace(self.issued) {
            debug!(superseded = previous, seq = self.issued, "load superseded");
        }
        Ok(LoadTicket {
            seq: self.issued,
            page,
        })
    }

    /// Apply the response for `ticket` unless a newer load was issued.
    ///
    /// A failed load keeps the previously displayed page.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Page<T>>,
    ) -> Result<LoadOutcome> {
        if ticket.seq != self.issued {
            warn!(
                seq = ticket.seq,
                latest = self.issued,
                page = ticket.page,
                "discarding stale page response"
            );
            return Ok(LoadOutcome::Superseded);
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.page = Some(page);
                self.last_error = None;
                Ok(LoadOutcome::Applied)
            }
            Err(err) => {
                warn!(page = ticket.page, error = %err, "page load failed");
                self.last_error = Some(err.to_failure());
                Err(err)
            }
        }
    }

    /// Check a navigation target against the known page count
    pub fn validate_target(&self, page: u32) -> Result<()> {
        let last = self.last_page();
        if page < 1 || page > last {
            return Err(DeskError::Validation(format!(
                "page {page} is out of range (1-{last})"
            )));
        }
        Ok(())
    }
}

impl<T: RemoteEntity> PaginatedStore<T> {
    /// Fetch `page` and make it current.
    ///
    /// If the collection shrank so that `page` is now past the end, the last
    /// page is loaded instead, once.
    pub async fn load<C: ResourceClient>(&mut self, client: &C, page: u32) -> Result<LoadOutcome> {
        let outcome = self.fetch(client, page).await?;
        if outcome == LoadOutcome::Applied && self.current_page() > self.last_page() {
            let last = self.last_page();
            debug!(requested = page, last, "page past the end, loading last page");
            return self.fetch(client, last).await;
        }
        Ok(outcome)
    }

    async fn fetch<C: ResourceClient>(&mut self, client: &C, page: u32) -> Result<LoadOutcome> {
        let ticket = self.begin_load(page)?;
        let result = client.list::<T>(page, self.page_size).await;
        self.finish_load(ticket, result)
    }

    /// Navigate to `page`; out-of-range targets are rejected without a call
    pub async fn go_to<C: ResourceClient>(&mut self, client: &C, page: u32) -> Result<LoadOutcome> {
        self.validate_target(page)?;
        self.load(client, page).await
    }

    pub async fn next<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let target = self.current_page().saturating_add(1);
        self.go_to(client, target).await
    }

    pub async fn prev<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let target = self.current_page().saturating_sub(1);
        self.go_to(client, target).await
    }

    /// Reload the current page after a mutation
    pub async fn invalidate<C: ResourceClient>(&mut self, client: &C) -> Result<LoadOutcome> {
        let page = self.current_page();
        self.load(client, page).await
    }
}
