//! Page request and page result types for member listings.
//!
//! Page numbers are zero-based. Ordering inside a page is decided by the
//! query that produced it; member pages are always `member_id ASC`.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Zero-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Creates a request for page `page` with `size` rows per page.
    ///
    /// A size of `0` falls back to `DEFAULT_PAGE_SIZE`; sizes above
    /// `MAX_PAGE_SIZE` are clamped.
    pub fn of(page: u32, size: u32) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            value => value.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u32 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the totals of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = if size > 0 {
            total_elements.div_ceil(size)
        } else {
            0
        };

        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages
    }

    /// Maps the page content while keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    #[test]
    fn page_request_normalizes_size() {
        assert_eq!(PageRequest::of(0, 0).size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::of(0, 1_000).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::of(2, 3).offset(), 6);
    }

    #[test]
    fn page_totals_round_up() {
        let page = Page::new(vec![1, 2, 3], PageRequest::of(0, 3), 5);
        assert_eq!(page.total_pages, 2);
        assert!(page.is_first());
        assert!(page.has_next());

        let last = Page::new(vec![4, 5], PageRequest::of(1, 3), 5);
        assert!(!last.has_next());
    }

    #[test]
    fn map_keeps_totals() {
        let page = Page::new(vec![1, 2], PageRequest::of(0, 2), 4).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 4);
        assert_eq!(page.total_pages, 2);
    }
}
