//! Page request and page result types.
//!
//! # Invariants
//! - `PageRequest::page_size` is always greater than zero.
//! - `Page::content.len()` never exceeds `Page::page_size`.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected page parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    NegativePageNumber(i64),
    NonPositivePageSize(i64),
    OutOfRange { field: &'static str, value: i64 },
}

impl Display for PageRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativePageNumber(value) => {
                write!(f, "page number must not be negative, got {value}")
            }
            Self::NonPositivePageSize(value) => {
                write!(f, "page size must be greater than zero, got {value}")
            }
            Self::OutOfRange { field, value } => write!(f, "{field} {value} is out of range"),
        }
    }
}

impl Error for PageRequestError {}

/// Zero-based page window over an id-ordered result.
///
/// Only constructible through [`PageRequest::of`], so never deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validates raw caller input into a page request.
    ///
    /// # Errors
    /// - Negative `page_number`, non-positive `page_size`, or either value
    ///   beyond `u32::MAX`.
    pub fn of(page_number: i64, page_size: i64) -> Result<Self, PageRequestError> {
        if page_number < 0 {
            return Err(PageRequestError::NegativePageNumber(page_number));
        }
        if page_size <= 0 {
            return Err(PageRequestError::NonPositivePageSize(page_size));
        }
        let page_number = u32::try_from(page_number).map_err(|_| PageRequestError::OutOfRange {
            field: "page number",
            value: page_number,
        })?;
        let page_size = u32::try_from(page_size).map_err(|_| PageRequestError::OutOfRange {
            field: "page size",
            value: page_size,
        })?;
        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first row of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }

    /// Request for the following page with the same size.
    pub fn next(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// Bounded window of results plus total-count metadata.
///
/// Output only: built by [`Page::new`] from a validated [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    content: Vec<T>,
    total_elements: u64,
    page_number: u32,
    page_size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        debug_assert!(
            content.len() <= request.page_size() as usize,
            "page content exceeds requested size"
        );
        Self {
            content,
            total_elements,
            page_number: request.page_number(),
            page_size: request.page_size(),
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Requested page size (not the number of rows on this page).
    pub fn size(&self) -> u32 {
        self.page_size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn is_first(&self) -> bool {
        self.page_number == 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page_number) + 1 < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest, PageRequestError};

    #[test]
    fn of_rejects_invalid_parameters() {
        assert_eq!(
            PageRequest::of(-1, 3),
            Err(PageRequestError::NegativePageNumber(-1))
        );
        assert_eq!(
            PageRequest::of(0, 0),
            Err(PageRequestError::NonPositivePageSize(0))
        );
        assert!(matches!(
            PageRequest::of(i64::from(u32::MAX) + 1, 3),
            Err(PageRequestError::OutOfRange { .. })
        ));
    }

    #[test]
    fn offset_is_page_number_times_size() {
        let request = PageRequest::of(2, 3).unwrap();
        assert_eq!(request.offset(), 6);
        assert_eq!(request.next().offset(), 9);
    }

    #[test]
    fn page_metadata_is_derived_from_total() {
        let page = Page::new(vec![1, 2, 3], PageRequest::of(0, 3).unwrap(), 4);
        assert_eq!(page.size(), 3);
        assert_eq!(page.number_of_elements(), 3);
        assert_eq!(page.total_pages(), 2);
        assert!(page.is_first());
        assert!(page.has_next());

        let last = Page::new(vec![4], PageRequest::of(1, 3).unwrap(), 4);
        assert!(last.is_last());
        assert!(!last.is_first());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::of(0, 10).unwrap(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_last());
    }

    #[test]
    fn map_preserves_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::of(1, 2).unwrap(), 5).map(|n| n * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.total_elements(), 5);
        assert_eq!(page.page_number(), 1);
    }

    #[test]
    fn serializes_metadata_in_camel_case() {
        let page = Page::new(vec!["a"], PageRequest::of(2, 1).unwrap(), 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": ["a"],
                "totalElements": 3,
                "pageNumber": 2,
                "pageSize": 1
            })
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "page content exceeds requested size")]
    fn new_rejects_content_larger_than_the_request() {
        let _ = Page::new(vec![1, 2, 3], PageRequest::of(0, 2).unwrap(), 3);
    }
}
