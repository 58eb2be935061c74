//! Page requests sent to paginated endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Page size used when a caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// A page size of zero can never yield content.
    #[error("page size must be greater than zero")]
    ZeroSize,
    /// The requested page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size {size} exceeds the maximum of {max}")]
    SizeTooLarge {
        /// Requested size.
        size: u32,
        /// Maximum accepted size.
        max: u32,
    },
}

/// Zero-based page index plus page size.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 10).expect("valid request");
/// assert_eq!(request.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request for `page` with `size` items per page.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `size` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        if size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeTooLarge {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    /// Request the first page with `size` items.
    ///
    /// # Errors
    /// See [`PageRequest::new`].
    pub const fn first(size: u32) -> Result<Self, PageRequestError> {
        Self::new(0, size)
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items that precede this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64) * (self.size as u64)
    }

    /// Return a copy pointing at another page with the same size.
    #[must_use]
    pub const fn with_page(self, page: u32) -> Self {
        Self {
            page,
            size: self.size,
        }
    }

    /// Append `page` and `size` query parameters to `url`.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    /// use url::Url;
    ///
    /// let mut url = Url::parse("http://localhost/api/loans/paginated").expect("url");
    /// PageRequest::new(1, 25).expect("request").apply_to(&mut url);
    /// assert_eq!(url.query(), Some("page=1&size=25"));
    /// ```
    pub fn apply_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string());
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawPageRequest {
    page: u32,
    size: u32,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.size)
    }
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            size: value.size,
        }
    }
}
