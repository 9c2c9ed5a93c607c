//! Port for the canonical listing store.
//!
//! Mutations that race with other requests (view and report counters,
//! availability flips) are expressed as single atomic store operations so
//! adapters never read-modify-write in request memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::discovery::{BrowsePlan, LocationFrequency, SearchCriteria};
use crate::domain::{Availability, Listing, ListingDetails, ListingId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing store adapters.
    pub enum ListingRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "listing store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing store query failed: {message}",
    }
}

/// A window of listings plus the size of the full match set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Listings on the requested page, in presentation order.
    pub items: Vec<Listing>,
    /// Matches across all pages.
    pub total: u64,
}

/// Result of a conditional availability flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityChange {
    /// The flag flipped; the updated listing is returned.
    Changed(Listing),
    /// The listing was already in the requested state.
    AlreadyInState,
    /// No such listing.
    Missing,
}

/// Port for listing persistence and queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Store a freshly published listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Fetch one listing regardless of availability.
    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Fetch every listing among `ids` that still exists, in no particular
    /// order.
    async fn find_many(&self, ids: &[ListingId]) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Replace the owner-editable content and bump `updated_at`.
    ///
    /// Returns `None` when the listing does not exist.
    async fn update_details(
        &self,
        id: &ListingId,
        details: &ListingDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Flip availability to `target` only if it currently differs.
    async fn set_availability(
        &self,
        id: &ListingId,
        target: Availability,
        updated_at: DateTime<Utc>,
    ) -> Result<AvailabilityChange, ListingRepositoryError>;

    /// Atomically add one to the view counter, returning the new value.
    async fn increment_views(&self, id: &ListingId) -> Result<Option<u64>, ListingRepositoryError>;

    /// Atomically add `delta` to the report counter, flooring at zero, and
    /// return the new value.
    async fn adjust_report_count(
        &self,
        id: &ListingId,
        delta: i32,
    ) -> Result<Option<u32>, ListingRepositoryError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError>;

    /// Page through available listings in the order `plan` describes.
    async fn browse(
        &self,
        plan: &BrowsePlan,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError>;

    /// Page through available listings matching `criteria`, ordered by
    /// `criteria.order`.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError>;

    /// Location occurrence counts across available listings.
    async fn location_frequencies(&self) -> Result<Vec<LocationFrequency>, ListingRepositoryError>;

    /// Every listing owned by `owner`, available or not.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, ListingRepositoryError>;
}
