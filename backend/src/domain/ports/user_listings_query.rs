//! Driving port for owner-scoped listing views.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::discovery::SearchFilters;
use crate::domain::{
    Caller, Error, IndexScope, Listing, ListingDashboard, ListingId, UserId,
};

/// Read a user's own listings through the per-user index.
///
/// The caller must be `user_id`; anything else is `forbidden`. Index entries
/// whose listing no longer exists are omitted silently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserListingsQuery: Send + Sync {
    /// Listings in `scope`, posted-at descending.
    async fn list(
        &self,
        caller: &Caller,
        user_id: &UserId,
        scope: IndexScope,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error>;

    /// One indexed listing.
    async fn get(
        &self,
        caller: &Caller,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Listing, Error>;

    /// Search within the user's listings in `scope`.
    async fn search(
        &self,
        caller: &Caller,
        user_id: &UserId,
        scope: IndexScope,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error>;

    /// Totals for the owner dashboard.
    async fn dashboard(&self, caller: &Caller, user_id: &UserId)
    -> Result<ListingDashboard, Error>;
}
