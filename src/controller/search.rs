//! Incremental search session.
//!
//! Drives a search-as-you-type lookup: every change of a query longer than
//! one character issues exactly one remote search; shorter queries close the
//! suggestion list without touching the network. Responses are sequenced the
//! same way as page loads, so only the answer for the latest query is kept.

use tracing::{debug, warn};

use crate::error::Result;
use crate::remote::{RemoteEntity, ResourceClient};
use crate::types::Ship;

/// Queries must be longer than this to reach the server
pub const MIN_QUERY_CHARS: usize = 2;

/// A record that can be offered as a search suggestion
pub trait Suggestion {
    /// Text shown in the suggestion list
    fn display_name(&self) -> &str;

    /// Identifier mirrored into the query on selection, and submitted by a
    /// dependent form in place of user-typed text
    fn canonical_id(&self) -> &str;
}

impl Suggestion for Ship {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn canonical_id(&self) -> &str {
        &self.imo
    }
}

/// Handle for one issued lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone)]
pub struct SearchSession<T> {
    query: String,
    suggestions: Vec<T>,
    open: bool,
    selection: Option<T>,
    issued: u64,
    in_flight: bool,
}

impl<T> Default for SearchSession<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            open: false,
            selection: None,
            issued: 0,
            in_flight: false,
        }
    }
}

impl<T: Clone> SearchSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Suggestions for the current query; always empty for short queries
    pub fn suggestions(&self) -> &[T] {
        if self.is_short() {
            &[]
        } else {
            &self.suggestions
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selection(&self) -> Option<&T> {
        self.selection.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight
    }

    fn is_short(&self) -> bool {
        self.query.chars().count() < MIN_QUERY_CHARS
    }

    /// Register a keystroke.
    ///
    /// Returns a ticket when a lookup must be issued for the new query.
    pub fn input(&mut self, query: &str) -> Option<SearchTicket> {
        if query == self.query {
            return None;
        }
        self.query = query.to_string();
        // Any pending answer belongs to an older query now
        self.issued += 1;

        if self.is_short() {
            self.open = false;
            self.suggestions.clear();
            self.in_flight = false;
            return None;
        }

        self.open = true;
        self.in_flight = true;
        Some(SearchTicket {
            seq: self.issued,
            query: self.query.clone(),
        })
    }

    /// Apply the answer for `ticket`, dropping it if the query moved on.
    ///
    /// On failure the previous suggestions stay in place.
    pub fn finish(&mut self, ticket: SearchTicket, result: Result<Vec<T>>) -> Result<bool> {
        if ticket.seq != self.issued {
            debug!(query = %ticket.query, "discarding stale suggestions");
            return Ok(false);
        }
        self.in_flight = false;
        match result {
            Ok(found) => {
                self.suggestions = found;
                Ok(true)
            }
            Err(err) => {
                warn!(query = %ticket.query, error = %err, "suggestion lookup failed");
                Err(err)
            }
        }
    }

    /// Replace the query without issuing a lookup
    pub fn set_query(&mut self, query: &str) {
        self.issued += 1;
        self.query = query.to_string();
        self.suggestions.clear();
        self.open = false;
        self.in_flight = false;
    }

    /// Interaction outside the suggestion list; the selection is kept
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    /// Forget query, suggestions and selection
    pub fn clear(&mut self) {
        self.issued += 1;
        self.query.clear();
        self.suggestions.clear();
        self.open = false;
        self.selection = None;
        self.in_flight = false;
    }
}

impl<T: Suggestion + Clone> SearchSession<T> {
    /// Commit the suggestion at `index`.
    ///
    /// The query is replaced by the suggestion's canonical id without
    /// issuing a lookup, and the list closes.
    pub fn select(&mut self, index: usize) -> Option<&T> {
        let chosen = self.suggestions().get(index)?.clone();
        self.issued += 1;
        self.in_flight = false;
        self.query = chosen.canonical_id().to_string();
        self.open = false;
        self.selection = Some(chosen);
        self.selection.as_ref()
    }

    /// Canonical identifier of the selection, if any
    pub fn selected_id(&self) -> Option<&str> {
        self.selection.as_ref().map(Suggestion::canonical_id)
    }
}

impl<T: RemoteEntity> SearchSession<T> {
    /// Type `query` and run the resulting lookup, if any
    pub async fn type_query<C: ResourceClient>(&mut self, client: &C, query: &str) -> Result<bool> {
        let Some(ticket) = self.input(query) else {
            return Ok(false);
        };
        let result = client.search::<T>(ticket.query()).await;
        self.finish(ticket, result)
    }
}
