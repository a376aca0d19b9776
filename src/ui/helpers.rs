use std::fmt::Display;

/// How many ISBNs fit in the table cell before the rest are summarized.
const VISIBLE_ISBNS: usize = 3;
const MISSING: &str = "-";

/// Author names as a single comma-separated cell.
pub(crate) fn join_authors(authors: &[String]) -> String {
    let names: Vec<&str> = authors
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        MISSING.to_string()
    } else {
        names.join(", ")
    }
}

/// First few ISBNs followed by a `+N more` marker. Popular works list dozens
/// of editions, which would otherwise swamp the row.
pub(crate) fn summarize_isbns(isbns: &[String]) -> String {
    if isbns.is_empty() {
        return MISSING.to_string();
    }
    let shown = isbns
        .iter()
        .take(VISIBLE_ISBNS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let hidden = isbns.len().saturating_sub(VISIBLE_ISBNS);
    if hidden > 0 {
        format!("{shown} +{hidden} more")
    } else {
        shown
    }
}

pub(crate) fn optional_value<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Pager line: position, hit count and page size.
pub(crate) fn pager_summary(page: u32, last_page: u32, total: u64, page_size: u32) -> String {
    let noun = if total == 1 { "result" } else { "results" };
    format!("Page {page}/{last_page} · {total} {noun} · {page_size} per page")
}
