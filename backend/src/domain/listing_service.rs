//! Owner-side listing lifecycle: publish, patch, deactivate, reactivate.
//!
//! Publishing writes the listing store first and the per-user index second.
//! The index is a derived read model: if the append fails the listing stays
//! published and the admin reconciliation sweep repairs the gap later.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::access::{require_owner, require_publisher};
use crate::domain::ports::{
    AvailabilityChange, ListingIndexRepository, ListingRepository, ListingsCommand,
};
use crate::domain::{
    Availability, Caller, Error, IndexEntry, Listing, ListingDetails, ListingId, ListingPatch,
};

/// Service implementing [`ListingsCommand`].
#[derive(Clone)]
pub struct ListingService<L: ?Sized, I: ?Sized> {
    listings: Arc<L>,
    index: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized, I: ?Sized> ListingService<L, I> {
    /// Create the service over a listing store and a per-user index.
    pub fn new(listings: Arc<L>, index: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            index,
            clock,
        }
    }
}

impl<L, I> ListingService<L, I>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
{
    async fn owned_listing(&self, caller: &Caller, id: &ListingId) -> Result<Listing, Error> {
        let listing = self
            .listings
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))?;
        require_owner(caller, &listing.owner_id)?;
        Ok(listing)
    }
}

#[async_trait]
impl<L, I> ListingsCommand for ListingService<L, I>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
{
    async fn create(&self, caller: &Caller, details: ListingDetails) -> Result<Listing, Error> {
        require_publisher(caller)?;
        details.validate()?;

        let listing = Listing::publish(
            ListingId::random(),
            caller.user_id.clone(),
            caller.role,
            details,
            self.clock.utc(),
        );
        self.listings.insert(&listing).await?;

        if let Err(err) = self.index.append(&IndexEntry::for_listing(&listing)).await {
            warn!(
                listing_id = %listing.id,
                owner_id = %listing.owner_id,
                error = %err,
                "listing published without index entry; reconciliation required"
            );
        }

        info!(listing_id = %listing.id, owner_id = %listing.owner_id, "listing published");
        Ok(listing)
    }

    async fn update(
        &self,
        caller: &Caller,
        id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, Error> {
        let current = self.owned_listing(caller, id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let merged = patch.apply(&current.details);
        merged.validate()?;

        self.listings
            .update_details(id, &merged, self.clock.utc())
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    async fn set_availability(
        &self,
        caller: &Caller,
        id: &ListingId,
        target: Availability,
    ) -> Result<Listing, Error> {
        self.owned_listing(caller, id).await?;

        match self
            .listings
            .set_availability(id, target, self.clock.utc())
            .await?
        {
            AvailabilityChange::Changed(listing) => {
                info!(listing_id = %id, state = target.label(), "listing availability changed");
                Ok(listing)
            }
            AvailabilityChange::AlreadyInState => Err(Error::conflict(format!(
                "listing is already {}",
                target.label()
            ))
            .with_details(json!({ "code": "already_in_state" }))),
            AvailabilityChange::Missing => Err(Error::not_found(format!("listing {id} not found"))),
        }
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
