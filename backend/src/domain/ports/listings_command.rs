//! Driving port for owner-side listing mutations.

use async_trait::async_trait;

use crate::domain::{Availability, Caller, Error, Listing, ListingDetails, ListingId, ListingPatch};

/// Publish and maintain listings.
///
/// Every method receives an already verified [`Caller`]; implementations
/// only compare it against role and ownership requirements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingsCommand: Send + Sync {
    /// Publish a listing owned by the caller and index it for them.
    ///
    /// Fails with `forbidden` unless the caller is a landlord or agent, and
    /// with `invalid_request` when `details` fails validation.
    async fn create(&self, caller: &Caller, details: ListingDetails) -> Result<Listing, Error>;

    /// Shallow-merge `patch` into the caller's listing.
    ///
    /// Fails with `not_found` for unknown ids and `forbidden` when the
    /// caller is not the owner.
    async fn update(
        &self,
        caller: &Caller,
        id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, Error>;

    /// Deactivate or reactivate the caller's listing.
    ///
    /// Fails with `conflict` when the listing is already in `target`.
    async fn set_availability(
        &self,
        caller: &Caller,
        id: &ListingId,
        target: Availability,
    ) -> Result<Listing, Error>;
}
