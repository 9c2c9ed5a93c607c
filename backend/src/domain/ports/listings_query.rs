//! Driving port for public discovery.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::discovery::{BrowseSort, SearchFilters};
use crate::domain::{Caller, Error, Listing, ListingId};

/// Browse, search, and fetch listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingsQuery: Send + Sync {
    /// Fetch one listing.
    ///
    /// Deactivated listings are only visible to their owner and to
    /// administrators; everyone else gets `not_found`.
    async fn get(&self, caller: Option<Caller>, id: &ListingId) -> Result<Listing, Error>;

    /// Page through available listings.
    async fn browse(
        &self,
        sort: BrowseSort,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error>;

    /// Search available listings. An empty match set is a success.
    async fn search(
        &self,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error>;
}
