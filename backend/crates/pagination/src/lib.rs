//! Page-window primitives shared by every paginated listing surface.
//!
//! Pagination throughout the backend is 1-based: a [`PageRequest`] names a
//! page number and a page size (`limit`), and a [`PageInfo`] summarises where
//! a returned page sits relative to the full result set. Stores that page
//! natively use [`PageRequest::offset`]; in-memory read models use
//! [`PageRequest::window`] to slice an already ordered collection.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageRequest, Paginated};
//!
//! let request = PageRequest::new(2, 2).expect("valid window");
//! let page = Paginated::from_ordered(vec![1, 2, 3, 4, 5], request);
//! assert_eq!(page.items, vec![3, 4]);
//! assert_eq!(page.info.total_pages, 3);
//! assert!(page.info.has_next_page);
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when a caller omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when a caller omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 50;

/// Reasons a requested page window is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `limit` was zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Largest accepted limit.
        max: u32,
    },
}

/// A validated 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Validate and build a page window.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::PageOutOfRange`] when `page` is zero and
    /// [`PageRequestError::LimitOutOfRange`] when `limit` is zero or larger
    /// than [`MAX_LIMIT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{PageRequest, PageRequestError};
    ///
    /// assert!(PageRequest::new(1, 10).is_ok());
    /// assert_eq!(PageRequest::new(0, 10), Err(PageRequestError::PageOutOfRange));
    /// ```
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// Build a page window, substituting defaults for absent values.
    ///
    /// # Errors
    ///
    /// Propagates the same validation failures as [`PageRequest::new`].
    pub fn from_optional(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1).saturating_mul(self.limit as u64)
    }

    /// Slice an already ordered collection down to this page.
    #[must_use]
    pub fn window<T>(self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }

    /// Describe a page containing `returned` items out of `total`.
    #[must_use]
    pub fn page_info(self, total: u64, returned: usize) -> PageInfo {
        let total_pages = total.div_ceil(u64::from(self.limit));
        let returned_count = u64::try_from(returned).unwrap_or(u64::MAX);
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
            has_next_page: u64::from(self.page) < total_pages,
            has_prev_page: self.page > 1,
            has_more: self.offset().saturating_add(returned_count) < total,
        }
    }
}

/// Position of a returned page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The 1-based page number that was served.
    pub page: u32,
    /// Page size used for the window.
    pub limit: u32,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// `ceil(total / limit)`; zero when nothing matched.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Whether an earlier page exists.
    pub has_prev_page: bool,
    /// Whether items remain after this page (`offset + returned < total`).
    pub has_more: bool,
}

/// A page of items together with its [`PageInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    /// Items on this page, in presentation order.
    pub items: Vec<T>,
    /// Where this page sits in the full result set.
    pub info: PageInfo,
}

impl<T> Paginated<T> {
    /// Wrap a page that a store already windowed, given the full total.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let info = request.page_info(total, items.len());
        Self { items, info }
    }

    /// Window a fully ordered collection in memory.
    #[must_use]
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        Self::new(request.window(all), total, request)
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
