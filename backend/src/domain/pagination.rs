//! Offset pagination shared by every list operation.

use serde::Serialize;

use super::validation::FieldError;

/// Items returned per page.
pub const ITEMS_PER_PAGE: u32 = 10;

/// A 1-based page request with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Request page `page` (1-based).
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::PageRequest;
    ///
    /// let request = PageRequest::new(3).unwrap();
    /// assert_eq!(request.offset(), 20);
    /// assert!(PageRequest::new(0).is_err());
    /// ```
    pub fn new(page: u32) -> Result<Self, FieldError> {
        if page == 0 {
            return Err(FieldError::Malformed { field: "page" });
        }
        Ok(Self {
            page,
            per_page: ITEMS_PER_PAGE,
        })
    }

    /// The first page.
    pub const fn first() -> Self {
        Self {
            page: 1,
            per_page: ITEMS_PER_PAGE,
        }
    }

    /// 1-based page number.
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items to skip.
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Slice an in-memory, already ordered collection.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Page<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let window: Vec<T> = items
            .iter()
            .skip(start)
            .take(self.per_page as usize)
            .cloned()
            .collect();
        Page::new(window, *self, items.len() as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of results with the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page for `request`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    /// Number of pages needed to hold `total` items.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page))
    }

    /// Convert each item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0)]
    #[case(2, 10)]
    #[case(5, 40)]
    fn offsets_follow_page_size(#[case] page: u32, #[case] offset: u64) {
        assert_eq!(PageRequest::new(page).expect("page").offset(), offset);
    }

    #[rstest]
    fn slices_in_memory_collections() {
        let items: Vec<u32> = (1..=23).collect();
        let page = PageRequest::new(3).expect("page").slice(&items);
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages(), 3);
    }

    #[rstest]
    fn pages_past_the_end_are_empty() {
        let items = vec!["a", "b"];
        let page = PageRequest::new(4).expect("page").slice(&items);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }
}
