//! Owner-scoped listing views backed by the per-user index.
//!
//! Every read resolves index entries against the listing store, drops
//! entries whose listing is gone, and orders by posted-at descending.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};
use tracing::warn;

use crate::domain::access::require_owner;
use crate::domain::discovery::SearchFilters;
use crate::domain::ports::{ListingIndexRepository, ListingRepository, UserListingsQuery};
use crate::domain::{
    Caller, Error, IndexEntry, IndexScope, Listing, ListingDashboard, ListingId, UserId,
};

/// Service implementing [`UserListingsQuery`].
#[derive(Clone)]
pub struct UserListingsService<L: ?Sized, I: ?Sized> {
    listings: Arc<L>,
    index: Arc<I>,
}

impl<L: ?Sized, I: ?Sized> UserListingsService<L, I> {
    /// Create the service over the listing store and the per-user index.
    pub fn new(listings: Arc<L>, index: Arc<I>) -> Self {
        Self { listings, index }
    }
}

impl<L, I> UserListingsService<L, I>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
{
    /// Indexed listings that still exist, posted-at descending.
    async fn resolved(&self, user_id: &UserId) -> Result<Vec<Listing>, Error> {
        let mut entries = self.index.entries(user_id).await?;
        entries.sort_by(|a, b| {
            b.posted_at
                .cmp(&a.posted_at)
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });

        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.listing_id));

        let ids: Vec<ListingId> = entries.iter().map(|entry| entry.listing_id).collect();
        let mut by_id: HashMap<ListingId, Listing> = self
            .listings
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        let resolved: Vec<Listing> = entries
            .iter()
            .filter_map(|entry: &IndexEntry| by_id.remove(&entry.listing_id))
            .collect();
        let stale = entries.len().saturating_sub(resolved.len());
        if stale > 0 {
            warn!(%user_id, stale, "skipped index entries for removed listings");
        }
        Ok(resolved)
    }

    async fn scoped(
        &self,
        caller: &Caller,
        user_id: &UserId,
        scope: IndexScope,
    ) -> Result<Vec<Listing>, Error> {
        require_owner(caller, user_id)?;
        let mut listings = self.resolved(user_id).await?;
        listings.retain(|listing| scope.admits(listing));
        Ok(listings)
    }
}

#[async_trait]
impl<L, I> UserListingsQuery for UserListingsService<L, I>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
{
    async fn list(
        &self,
        caller: &Caller,
        user_id: &UserId,
        scope: IndexScope,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error> {
        let listings = self.scoped(caller, user_id, scope).await?;
        Ok(Paginated::from_ordered(listings, page))
    }

    async fn get(
        &self,
        caller: &Caller,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Listing, Error> {
        require_owner(caller, user_id)?;
        let indexed = self
            .index
            .entries(user_id)
            .await?
            .iter()
            .any(|entry| entry.listing_id == *listing_id);
        if !indexed {
            return Err(Error::not_found(format!(
                "listing {listing_id} not found for user"
            )));
        }
        self.listings
            .find(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))
    }

    async fn search(
        &self,
        caller: &Caller,
        user_id: &UserId,
        scope: IndexScope,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error> {
        let criteria = filters.resolve()?;
        let listings = self.scoped(caller, user_id, scope).await?;
        Ok(Paginated::from_ordered(criteria.apply(listings), page))
    }

    async fn dashboard(
        &self,
        caller: &Caller,
        user_id: &UserId,
    ) -> Result<ListingDashboard, Error> {
        require_owner(caller, user_id)?;
        let listings = self.resolved(user_id).await?;
        Ok(ListingDashboard::tally(&listings))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::listing::fixtures::{details, listing};
    use crate::domain::{ErrorCode, UserRole};
    use crate::outbound::memory::{MemoryListingIndex, MemoryListingStore};

    struct Harness {
        service: UserListingsService<MemoryListingStore, MemoryListingIndex>,
        store: Arc<MemoryListingStore>,
        owner: Caller,
        listings: Vec<Listing>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryListingStore::default());
        let index = Arc::new(MemoryListingIndex::default());
        let owner = Caller::new(UserId::random(), UserRole::Landlord);
        let mut listings = vec![
            listing(&owner.user_id, details("first", "Lekki", 1, 100), 0),
            listing(&owner.user_id, details("second", "Yaba", 2, 200), 10),
            listing(&owner.user_id, details("third", "Lekki", 3, 300), 20),
        ];
        if let Some(second) = listings.get_mut(1) {
            second.is_available = false;
        }
        // Append out of chronological order; reads must re-sort.
        for item in listings.iter().rev() {
            store.insert(item).await.expect("seed listing");
            index
                .append(&IndexEntry::for_listing(item))
                .await
                .expect("seed index");
        }
        Harness {
            service: UserListingsService::new(store.clone(), index),
            store,
            owner,
            listings,
        }
    }

    fn page() -> PageRequest {
        PageRequest::default()
    }

    fn titles(page: &Paginated<Listing>) -> Vec<&str> {
        page.items.iter().map(|l| l.details.title.as_str()).collect()
    }

    #[tokio::test]
    async fn active_listings_are_newest_first() {
        let h = harness().await;
        let active = h
            .service
            .list(&h.owner, &h.owner.user_id, IndexScope::Active, page())
            .await
            .expect("list");
        assert_eq!(titles(&active), vec!["third", "first"]);

        let hidden = h
            .service
            .list(&h.owner, &h.owner.user_id, IndexScope::Deactivated, page())
            .await
            .expect("list");
        assert_eq!(titles(&hidden), vec!["second"]);
    }

    #[tokio::test]
    async fn deleted_listings_are_omitted_silently() {
        let h = harness().await;
        let third = h.listings.get(2).map(|l| l.id).expect("third listing");
        h.store.delete(&third).await.expect("delete");

        let active = h
            .service
            .list(&h.owner, &h.owner.user_id, IndexScope::Active, page())
            .await
            .expect("list");
        assert_eq!(titles(&active), vec!["first"]);
        assert_eq!(active.info.total, 1);

        let dashboard = h
            .service
            .dashboard(&h.owner, &h.owner.user_id)
            .await
            .expect("dashboard");
        assert_eq!(dashboard.total_listings, 2);
        assert_eq!(dashboard.active_listings, 1);
        assert_eq!(dashboard.deactivated_listings, 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stale_index_entries_are_logged_as_warnings() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let h = harness().await;
        let first = h.listings.first().map(|l| l.id).expect("first listing");
        h.store.delete(&first).await.expect("delete");
        h.service
            .list(&h.owner, &h.owner.user_id, IndexScope::Active, page())
            .await
            .expect("list");

        let output = String::from_utf8(logs.0.lock().expect("log buffer").clone())
            .expect("utf-8 logs");
        assert!(output.contains("WARN"), "logs: {output}");
        assert!(output.contains("skipped index entries"), "logs: {output}");
    }

    #[tokio::test]
    async fn other_users_are_forbidden() {
        let h = harness().await;
        let stranger = Caller::new(UserId::random(), UserRole::Landlord);
        let err = h
            .service
            .list(&stranger, &h.owner.user_id, IndexScope::Active, page())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn search_filters_within_scope() {
        let h = harness().await;
        let hits = h
            .service
            .search(
                &h.owner,
                &h.owner.user_id,
                IndexScope::Active,
                SearchFilters {
                    location: Some("lekki".to_owned()),
                    min_price: Some(150),
                    ..SearchFilters::default()
                },
                page(),
            )
            .await
            .expect("search");
        assert_eq!(titles(&hits), vec!["third"]);
    }

    #[tokio::test]
    async fn get_requires_an_index_entry() {
        let h = harness().await;
        let first = h.listings.first().map(|l| l.id).expect("first listing");
        let found = h
            .service
            .get(&h.owner, &h.owner.user_id, &first)
            .await
            .expect("indexed listing");
        assert_eq!(found.id, first);

        let err = h
            .service
            .get(&h.owner, &h.owner.user_id, &ListingId::random())
            .await
            .expect_err("not indexed");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
