use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Zero-based page selection, as read from `?page=&size=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }.clamped()
    }

    /// Keeps `size` within `1..=MAX_PAGE_SIZE`.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page,
            size: self.size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of a listing ordered by ascending id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slices an already ordered collection.
    pub fn slice(rows: impl IntoIterator<Item = T>, request: PageRequest) -> Self {
        let request = request.clamped();
        let mut total = 0;
        let mut items = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            total += 1;
            if index >= request.offset() && items.len() < request.size {
                items.push(row);
            }
        }
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_middle_page() {
        let page = Page::slice(1..=45, PageRequest::new(1, 20));
        assert_eq!(page.items.first(), Some(&21));
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total, 45);
    }

    #[test]
    fn test_slice_past_end_is_empty() {
        let page = Page::slice(1..=5, PageRequest::new(3, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 5000).size, MAX_PAGE_SIZE);
    }
}
