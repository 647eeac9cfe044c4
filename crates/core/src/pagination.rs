//! Page-based pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters for a paginated list (`?page=2&perPage=24`).
///
/// Pages are 1-based. Missing or zero values fall back to the defaults and
/// `per_page` is clamped to [`PageRequest::MAX_PER_PAGE`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    /// Default page size.
    pub const DEFAULT_PER_PAGE: u32 = 24;
    /// Largest allowed page size.
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build a request for a specific page.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// The clamped page size.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .filter(|p| *p > 0)
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .min(Self::MAX_PER_PAGE)
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    /// Assemble a page from the rows and the total row count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let per_page = request.limit();
        let total = total.max(0);
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }

    /// Transform every item, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), PageRequest::DEFAULT_PER_PAGE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let request = PageRequest::new(0, 10_000);
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), PageRequest::MAX_PER_PAGE);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3], PageRequest::new(1, 3), 7);
        assert_eq!(page.total_pages, 3);
        let empty: Paginated<i32> = Paginated::new(vec![], PageRequest::new(1, 3), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Paginated::new(vec![1, 2], PageRequest::new(2, 2), 4).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 4);
    }
}
