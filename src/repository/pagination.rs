use serde::{Deserialize, Serialize};

/// Default and maximum number of rows per page.
pub const MAX_PAGE_SIZE: u64 = 25;

/// Page request as received from a client. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// The requested page, with missing or zero pages read as the first one.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Row window for a query: `limit` is in `[1, max]`, `offset` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    /// Translate a page request into a row window, capping the page size at `max_page_size`.
    pub fn from_query(query: PageQuery, max_page_size: u64) -> Self {
        let max_page_size = max_page_size.max(1);
        let limit = query.limit.unwrap_or(max_page_size).clamp(1, max_page_size);
        let offset = (query.page() - 1).saturating_mul(limit);
        Self { limit, offset }
    }
}

/// Page metadata returned alongside paginated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(query: PageQuery, window: PageWindow, total_items: u64) -> Self {
        Self {
            page: query.page(),
            limit: window.limit,
            total_items,
            total_pages: total_items.div_ceil(window.limit),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    /// Transform the page items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_capped_at_max() {
        let window = PageWindow::from_query(PageQuery::new(1, 999), MAX_PAGE_SIZE);
        assert_eq!(window, PageWindow { limit: 25, offset: 0 });
    }

    #[test]
    fn test_offset_from_page() {
        let window = PageWindow::from_query(PageQuery::new(3, 10), MAX_PAGE_SIZE);
        assert_eq!(window, PageWindow { limit: 10, offset: 20 });
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let window = PageWindow::from_query(PageQuery::default(), MAX_PAGE_SIZE);
        assert_eq!(window, PageWindow { limit: 25, offset: 0 });
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let window = PageWindow::from_query(
            PageQuery {
                page: Some(0),
                limit: Some(0),
            },
            MAX_PAGE_SIZE,
        );
        assert_eq!(window, PageWindow { limit: 1, offset: 0 });
    }

    #[test]
    fn test_page_info_rounds_pages_up() {
        let query = PageQuery::new(2, 10);
        let window = PageWindow::from_query(query, MAX_PAGE_SIZE);
        let info = PageInfo::new(query, window, 21);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.page, 2);

        let empty = PageInfo::new(query, window, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
