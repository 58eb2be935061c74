//! Page envelope returned by paginated endpoints.

use serde::{Deserialize, Serialize};

use crate::PageRequest;

/// One page of results plus the totals reported by the source.
///
/// Field names follow the Spring Data JSON envelope (`number`, `totalPages`,
/// `totalElements`, ...). Unknown envelope fields such as `pageable` or
/// `sort` are ignored when deserialising.
///
/// Totals always describe the source's view of the data. Narrowing the
/// visible content with [`Page::retain`] leaves them untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in source order.
    pub content: Vec<T>,
    /// Zero-based index of this page.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
    /// Total number of pages reported by the source.
    pub total_pages: u32,
    /// Total number of items reported by the source.
    pub total_elements: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
    /// Whether `content` is empty.
    pub empty: bool,
}

impl<T> Page<T> {
    /// Assemble a page for `request` from already-sliced `content`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(1, 2).expect("request");
    /// let page = Page::assemble(vec!["c", "d"], request, 5);
    /// assert_eq!(page.total_pages, 3);
    /// assert!(!page.first);
    /// assert!(!page.last);
    /// ```
    #[must_use]
    pub fn assemble(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let total_pages = u32::try_from(total_elements.div_ceil(u64::from(request.size())))
            .unwrap_or(u32::MAX);
        let number = request.page();
        Self {
            empty: content.is_empty(),
            content,
            number,
            size: request.size(),
            total_pages,
            total_elements,
            first: number == 0,
            last: number.saturating_add(1) >= total_pages,
        }
    }

    /// Keep only the items matching `keep`; totals are preserved.
    #[must_use]
    pub fn retain(mut self, keep: impl FnMut(&T) -> bool) -> Self {
        self.content.retain(keep);
        self.empty = self.content.is_empty();
        self
    }

    /// Transform every item while keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
