//! Domain models shared by the controller, the HTTP layer, and the TUI. These
//! types stay light-weight data holders so the other layers can focus on
//! request plumbing and presentation.

use std::fmt;

/// Page sizes offered by the pager. Cycling with `+`/`-` walks this list.
pub const PAGE_SIZE_OPTIONS: &[u32] = &[10, 20, 50, 100];

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Fields the catalog can sort by. Only the publication year is exposed in the
/// UI, but keeping this an enum means the wire name lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FirstPublishYear,
}

impl SortField {
    /// Name sent in the `sort` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::FirstPublishYear => "first_publish_year",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything a single search request depends on. The controller mutates this
/// in response to typing, paging and the sort toggle, and every fetch is built
/// from a snapshot of it.
pub struct SearchState {
    /// Free-text query forwarded verbatim as `q`.
    pub query: String,
    /// 1-based page number shown in the pager.
    pub page: u32,
    /// Rows requested per page; sent as `limit`.
    pub page_size: u32,
    /// Optional sort field; `None` is sent as an empty `sort` parameter.
    pub sort: Option<SortField>,
}

impl SearchState {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page: 1,
            page_size,
            sort: None,
        }
    }

    /// Zero-based page index sent as `offset`.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    /// Value of the `sort` parameter, empty when sorting is off.
    pub fn sort_param(&self) -> &'static str {
        self.sort.map(|field| field.as_param()).unwrap_or("")
    }

    /// Number of the first row on the current page, used for the `No` column.
    pub fn first_row_number(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size) + 1
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One table row, mapped from a catalog document. Rows are replaced wholesale
/// on every successful fetch.
pub struct ResultRow {
    /// Catalog key such as `/works/OL45804W`; doubles as the row identity and
    /// the path of the work's page.
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Missing for a surprising number of catalog entries.
    pub first_publish_year: Option<i32>,
    pub isbns: Vec<String>,
    pub page_count_median: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Outcome of a successful search: the total hit count and the current page.
pub struct FetchResult {
    pub total_count: u64,
    pub rows: Vec<ResultRow>,
}

/// Step through [`PAGE_SIZE_OPTIONS`] from `current`. Sizes that are not in the
/// list snap to the nearest option in the direction of travel.
pub fn step_page_size(current: u32, step: i32) -> u32 {
    if step > 0 {
        PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|size| *size > current)
            .unwrap_or(current)
    } else if step < 0 {
        PAGE_SIZE_OPTIONS
            .iter()
            .rev()
            .copied()
            .find(|size| *size < current)
            .unwrap_or(current)
    } else {
        current
    }
}
