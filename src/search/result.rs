//! Paginated search result

use serde::Serialize;
use serde_json::Value;

/// One page of search results plus pagination metadata.
///
/// `total` counts every item matching the filter, not just this page.
/// `current_page` and `limit` echo the request, even past the last page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<E> {
    /// The items on the current page
    pub items: Vec<E>,

    /// Total number of matching items (after filtering, before pagination)
    pub total: usize,

    /// Requested page number (starts at 1)
    pub current_page: usize,

    /// Requested page size
    pub limit: usize,

    /// `ceil(total / limit)`, at least 1
    pub last_page: usize,
}

impl<E> SearchResult<E> {
    pub fn new(items: Vec<E>, total: usize, current_page: usize, limit: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let last_page = total.div_ceil(limit).max(1);

        Self {
            items,
            total,
            current_page,
            limit,
            last_page,
        }
    }

    pub fn last_page(&self) -> usize {
        self.last_page
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Convert the items, keeping the metadata
    pub fn map_items<T>(self, f: impl FnMut(E) -> T) -> SearchResult<T> {
        SearchResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            limit: self.limit,
            last_page: self.last_page,
        }
    }
}

impl<E: Serialize> SearchResult<E> {
    /// JSON form with items serialized through their own `Serialize` impl
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to serialize search result items");
            serde_json::json!({
                "items": [],
                "total": self.total,
                "current_page": self.current_page,
                "limit": self.limit,
                "last_page": self.last_page,
            })
        })
    }
}
