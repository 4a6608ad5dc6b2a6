use std::ops::Range;
use std::sync::Arc;
use serde::Serialize;
use crate::core::types::{Record, RecordId};

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub items: Vec<Arc<Record>>,
    pub total_matched: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub took_ms: u64,
}

impl QueryResult {
    /// `ceil(total / page_size)`, 0 when nothing matched
    pub fn total_pages_for(total: usize, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        total.div_ceil(page_size)
    }

    /// Slice bounds of a 1-indexed page; past-the-end pages are empty
    pub fn page_window(total: usize, page: usize, page_size: usize) -> Range<usize> {
        let start = page.saturating_sub(1).saturating_mul(page_size);
        if start >= total {
            return total..total;
        }
        start..start.saturating_add(page_size).min(total)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Typeahead candidate, lower score is a closer match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub identifier: RecordId,
    pub display_name: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(QueryResult::total_pages_for(3, 2), 2);
        assert_eq!(QueryResult::total_pages_for(4, 2), 2);
        assert_eq!(QueryResult::total_pages_for(0, 10), 0);
    }

    #[test]
    fn window_clamps_to_total() {
        assert_eq!(QueryResult::page_window(3, 1, 2), 0..2);
        assert_eq!(QueryResult::page_window(3, 2, 2), 2..3);
        assert_eq!(QueryResult::page_window(3, 99, 2), 3..3);
        assert_eq!(QueryResult::page_window(0, 1, 20), 0..0);
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        assert_eq!(QueryResult::page_window(5, usize::MAX, usize::MAX), 5..5);
        assert_eq!(QueryResult::page_window(5, 1, usize::MAX), 0..5);
    }
}
