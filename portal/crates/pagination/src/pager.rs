//! Client-side cursor over a paginated listing.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_SIZE, Page, PageRequest, PageRequestError};

/// Tracks the current page and the bound observed from the last response.
///
/// `next` is a no-op once `page = totalPages - 1` (or when nothing has been
/// observed yet) and `previous` is a no-op at page 0. Both report whether the
/// cursor moved so callers can skip issuing a request.
///
/// # Examples
/// ```
/// use pagination::{Page, Pager};
///
/// let mut pager = Pager::new(10).expect("valid size");
/// let page = Page::<u8>::assemble(Vec::new(), pager.request(), 25);
/// pager.observe(&page);
/// assert!(pager.next());
/// assert!(pager.next());
/// assert!(!pager.next());
/// assert_eq!(pager.page(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPager", into = "RawPager")]
pub struct Pager {
    request: PageRequest,
    total_pages: u32,
}

impl Pager {
    /// Start at page 0 with `size` items per page.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `size` is not an acceptable page size.
    pub const fn new(size: u32) -> Result<Self, PageRequestError> {
        match PageRequest::first(size) {
            Ok(request) => Ok(Self {
                request,
                total_pages: 0,
            }),
            Err(error) => Err(error),
        }
    }

    /// Current zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.request.page()
    }

    /// Page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.request.size()
    }

    /// Last observed page count.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Request describing the current position.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Return to page 0, keeping the page size.
    pub const fn reset(&mut self) {
        self.request = self.request.with_page(0);
    }

    /// Record the page count reported by a response.
    pub const fn observe<T>(&mut self, page: &Page<T>) {
        self.total_pages = page.total_pages;
    }

    /// Advance one page unless already on the last one.
    pub const fn next(&mut self) -> bool {
        let current = self.request.page();
        if current.saturating_add(1) < self.total_pages {
            self.request = self.request.with_page(current + 1);
            true
        } else {
            false
        }
    }

    /// Step back one page unless already on the first one.
    pub const fn previous(&mut self) -> bool {
        let current = self.request.page();
        if current > 0 {
            self.request = self.request.with_page(current - 1);
            true
        } else {
            false
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            request: PageRequest::default(),
            total_pages: 0,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPager {
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
    #[serde(default)]
    total_pages: u32,
}

const fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl TryFrom<RawPager> for Pager {
    type Error = PageRequestError;

    fn try_from(value: RawPager) -> Result<Self, Self::Error> {
        Ok(Self {
            request: PageRequest::new(value.page, value.size)?,
            total_pages: value.total_pages,
        })
    }
}

impl From<Pager> for RawPager {
    fn from(value: Pager) -> Self {
        Self {
            page: value.page(),
            size: value.size(),
            total_pages: value.total_pages,
        }
    }
}
