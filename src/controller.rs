//! Page controller: owns the search state, the debounce timer and the current
//! result set. It performs no I/O. Every transition that needs a network
//! round-trip hands back a [`FetchRequest`]; the caller runs it and feeds the
//! [`FetchOutcome`] back through [`PageController::on_fetch_complete`].
//!
//! Each request carries a sequence number. Only the completion matching the
//! most recently issued request is applied, so a slow response can never
//! overwrite the results of a newer one.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::SearchError;
use crate::models::{step_page_size, FetchResult, ResultRow, SearchState, SortField};

/// A search the caller should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub state: SearchState,
}

/// Result of running a [`FetchRequest`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: Result<FetchResult, SearchError>,
}

/// Single pending deadline. Scheduling again replaces the previous deadline,
/// which is what cancels the superseded action.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per scheduled deadline, as soon as `now`
    /// reaches it.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

pub struct PageController {
    state: SearchState,
    loading: bool,
    rows: Vec<ResultRow>,
    total_count: u64,
    debounce: Debounce,
    last_issued: u64,
}

impl PageController {
    pub fn new(state: SearchState, debounce_window: Duration) -> Self {
        Self {
            state,
            loading: false,
            rows: Vec::new(),
            total_count: 0,
            debounce: Debounce::new(debounce_window),
            last_issued: 0,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sort_enabled(&self) -> bool {
        self.state.sort.is_some()
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Last reachable page for the current total, never less than 1.
    pub fn last_page(&self) -> u32 {
        let page_size = u64::from(self.state.page_size.max(1));
        let pages = self.total_count.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Record new query text and restart the quiet-period timer. A new search
    /// starts from the first page.
    pub fn on_query_change(&mut self, text: impl Into<String>, now: Instant) {
        self.state.query = text.into();
        self.state.page = 1;
        self.debounce.schedule(now);
    }

    /// Fire the debounced search once the quiet period has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<FetchRequest> {
        if self.debounce.fire(now) {
            self.fetch()
        } else {
            None
        }
    }

    /// Search right away, dropping any pending debounced search.
    pub fn flush_query(&mut self) -> Option<FetchRequest> {
        self.debounce.cancel();
        self.fetch()
    }

    /// Apply a pager change. A different page size invalidates the old page
    /// position, so the page resets to 1.
    pub fn on_page_change(&mut self, page: u32, page_size: u32) -> Option<FetchRequest> {
        let page_size = page_size.max(1);
        self.state.page = if page_size == self.state.page_size {
            page.max(1)
        } else {
            1
        };
        self.state.page_size = page_size;
        self.fetch()
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        let last = self.last_page();
        if self.state.page >= last {
            return None;
        }
        self.on_page_change(self.state.page + 1, self.state.page_size)
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if self.state.page <= 1 {
            return None;
        }
        self.on_page_change(self.state.page - 1, self.state.page_size)
    }

    pub fn cycle_page_size(&mut self, step: i32) -> Option<FetchRequest> {
        let next = step_page_size(self.state.page_size, step);
        if next == self.state.page_size {
            return None;
        }
        self.on_page_change(self.state.page, next)
    }

    pub fn on_sort_toggle(&mut self, enabled: bool) -> Option<FetchRequest> {
        self.state.sort = enabled.then_some(SortField::FirstPublishYear);
        self.fetch()
    }

    pub fn toggle_sort(&mut self) -> Option<FetchRequest> {
        let enabled = !self.sort_enabled();
        self.on_sort_toggle(enabled)
    }

    /// Build a request from the current state. Empty queries never reach the
    /// network.
    pub fn fetch(&mut self) -> Option<FetchRequest> {
        if self.state.query.is_empty() {
            return None;
        }

        self.last_issued += 1;
        self.loading = true;
        debug!(
            seq = self.last_issued,
            query = %self.state.query,
            page = self.state.page,
            page_size = self.state.page_size,
            sort = self.state.sort_param(),
            "issuing search"
        );

        Some(FetchRequest {
            seq: self.last_issued,
            state: self.state.clone(),
        })
    }

    /// Apply a completed search. Returns false when the completion belongs to
    /// a superseded request and was discarded.
    pub fn on_fetch_complete(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.seq != self.last_issued {
            debug!(
                seq = outcome.seq,
                latest = self.last_issued,
                "discarding stale search completion"
            );
            return false;
        }

        self.loading = false;
        match outcome.result {
            Ok(result) => {
                debug!(
                    seq = outcome.seq,
                    total = result.total_count,
                    rows = result.rows.len(),
                    "search completed"
                );
                self.total_count = result.total_count;
                self.rows = result.rows;
            }
            Err(err) => {
                warn!(seq = outcome.seq, error = %err, "search failed; keeping previous results");
            }
        }
        true
    }
}
