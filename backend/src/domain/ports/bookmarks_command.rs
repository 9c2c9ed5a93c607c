//! Driving port for tenant bookmarks.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::discovery::SearchFilters;
use crate::domain::{BookmarkEntry, BookmarkedListing, Caller, Error, Listing, ListingId};

/// Manage the caller's bookmark list. Tenant only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarksCommand: Send + Sync {
    /// Save `listing_id` at the front of the list.
    ///
    /// Fails with `not_found` for unknown listings and `conflict` when
    /// already bookmarked.
    async fn add(&self, caller: &Caller, listing_id: &ListingId) -> Result<BookmarkEntry, Error>;

    /// Drop `listing_id`; absent entries are not an error.
    async fn remove(&self, caller: &Caller, listing_id: &ListingId) -> Result<(), Error>;

    /// Empty the list, returning how many entries were removed.
    async fn clear(&self, caller: &Caller) -> Result<u64, Error>;

    /// Page through the list in stored order.
    async fn list(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkedListing>, Error>;

    /// Search bookmarked listings, newest listing first.
    async fn search(
        &self,
        caller: &Caller,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error>;
}
