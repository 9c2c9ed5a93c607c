//! Listing store kept in a map keyed by id.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use rand::seq::SliceRandom;

use crate::domain::discovery::{BrowsePlan, LocationFrequency, SearchCriteria, compare_recent};
use crate::domain::ports::{
    AvailabilityChange, ListingPage, ListingRepository, ListingRepositoryError,
};
use crate::domain::{Availability, Listing, ListingDetails, ListingId, UserId};

use super::{page_of, read, write};

const STORE: &str = "listing store";

/// In-memory [`ListingRepository`].
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    rows: RwLock<HashMap<ListingId, Listing>>,
}

impl MemoryListingStore {
    fn available(&self) -> Result<Vec<Listing>, ListingRepositoryError> {
        let rows = read(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(rows.values().filter(|l| l.is_available).cloned().collect())
    }

    fn mutate<T>(
        &self,
        id: &ListingId,
        f: impl FnOnce(&mut Listing) -> T,
    ) -> Result<Option<T>, ListingRepositoryError> {
        let mut rows = write(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(rows.get_mut(id).map(f))
    }
}

fn listing_page(items: Vec<Listing>, page: PageRequest) -> ListingPage {
    let (items, total) = page_of(items, page);
    ListingPage { items, total }
}

#[async_trait]
impl ListingRepository for MemoryListingStore {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut rows = write(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        rows.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let rows = read(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(rows.get(id).cloned())
    }

    async fn find_many(&self, ids: &[ListingId]) -> Result<Vec<Listing>, ListingRepositoryError> {
        let rows = read(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn update_details(
        &self,
        id: &ListingId,
        details: &ListingDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        self.mutate(id, |listing| {
            listing.details = details.clone();
            listing.updated_at = updated_at;
            listing.clone()
        })
    }

    async fn set_availability(
        &self,
        id: &ListingId,
        target: Availability,
        updated_at: DateTime<Utc>,
    ) -> Result<AvailabilityChange, ListingRepositoryError> {
        let change = self.mutate(id, |listing| {
            if listing.is_available == target.as_flag() {
                return AvailabilityChange::AlreadyInState;
            }
            listing.is_available = target.as_flag();
            listing.updated_at = updated_at;
            AvailabilityChange::Changed(listing.clone())
        })?;
        Ok(change.unwrap_or(AvailabilityChange::Missing))
    }

    async fn increment_views(&self, id: &ListingId) -> Result<Option<u64>, ListingRepositoryError> {
        self.mutate(id, |listing| {
            listing.views = listing.views.saturating_add(1);
            listing.views
        })
    }

    async fn adjust_report_count(
        &self,
        id: &ListingId,
        delta: i32,
    ) -> Result<Option<u32>, ListingRepositoryError> {
        self.mutate(id, |listing| {
            listing.report_count = listing.report_count.saturating_add_signed(delta);
            listing.report_count
        })
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut rows = write(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(rows.remove(id).is_some())
    }

    async fn browse(
        &self,
        plan: &BrowsePlan,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError> {
        let mut items = self.available()?;
        match plan {
            BrowsePlan::Recent => items.sort_by(compare_recent),
            BrowsePlan::Random => items.shuffle(&mut rand::thread_rng()),
            BrowsePlan::Popular(ranking) => items.sort_by(|a, b| ranking.compare(a, b)),
        }
        Ok(listing_page(items, page))
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError> {
        let hits = criteria.apply(self.available()?);
        Ok(listing_page(hits, page))
    }

    async fn location_frequencies(&self) -> Result<Vec<LocationFrequency>, ListingRepositoryError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for listing in self.available()? {
            *counts.entry(listing.details.location).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(location, count)| LocationFrequency { location, count })
            .collect())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, ListingRepositoryError> {
        let rows = read(&self.rows, STORE).map_err(ListingRepositoryError::query)?;
        Ok(rows
            .values()
            .filter(|l| &l.owner_id == owner)
            .cloned()
            .collect())
    }
}
