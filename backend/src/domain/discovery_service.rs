//! Public discovery: fetch, browse, and search available listings.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::discovery::{BrowsePlan, BrowseSort, LocationRanking, SearchFilters};
use crate::domain::ports::{ListingRepository, ListingsQuery};
use crate::domain::{Caller, Error, Listing, ListingId};

/// Service implementing [`ListingsQuery`].
#[derive(Clone)]
pub struct DiscoveryService<L: ?Sized> {
    listings: Arc<L>,
}

impl<L: ?Sized> DiscoveryService<L> {
    /// Create the service over the listing store.
    pub fn new(listings: Arc<L>) -> Self {
        Self { listings }
    }
}

impl<L> DiscoveryService<L>
where
    L: ListingRepository + ?Sized,
{
    /// Resolve a sort name into a plan, running the `popular` pre-pass.
    async fn plan(&self, sort: BrowseSort) -> Result<BrowsePlan, Error> {
        Ok(match sort {
            BrowseSort::Recent => BrowsePlan::Recent,
            BrowseSort::Random => BrowsePlan::Random,
            BrowseSort::Popular => {
                let frequencies = self.listings.location_frequencies().await?;
                BrowsePlan::Popular(LocationRanking::new(frequencies))
            }
        })
    }
}

#[async_trait]
impl<L> ListingsQuery for DiscoveryService<L>
where
    L: ListingRepository + ?Sized,
{
    async fn get(&self, caller: Option<Caller>, id: &ListingId) -> Result<Listing, Error> {
        let listing = self
            .listings
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))?;
        if listing.is_available {
            return Ok(listing);
        }
        let privileged = caller
            .as_ref()
            .is_some_and(|who| who.is(&listing.owner_id) || who.role.is_admin());
        if privileged {
            Ok(listing)
        } else {
            Err(Error::not_found(format!("listing {id} not found")))
        }
    }

    async fn browse(
        &self,
        sort: BrowseSort,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error> {
        let plan = self.plan(sort).await?;
        let found = self.listings.browse(&plan, page).await?;
        Ok(Paginated::new(found.items, found.total, page))
    }

    async fn search(
        &self,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error> {
        let criteria = filters.resolve()?;
        let found = self.listings.search(&criteria, page).await?;
        Ok(Paginated::new(found.items, found.total, page))
    }
}

#[cfg(test)]
#[path = "discovery_service_tests.rs"]
mod tests;
