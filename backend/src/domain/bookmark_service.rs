//! Tenant bookmarks.
//!
//! Uniqueness of `(tenant, listing)` is enforced by the store's atomic
//! insert; the first write wins and a duplicate surfaces as `conflict`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use serde_json::json;

use crate::domain::access::require_tenant;
use crate::domain::discovery::SearchFilters;
use crate::domain::ports::{BookmarkRepository, BookmarksCommand, ListingRepository};
use crate::domain::{
    BookmarkEntry, BookmarkInsert, BookmarkedListing, Caller, Error, Listing, ListingId,
};

/// Service implementing [`BookmarksCommand`].
#[derive(Clone)]
pub struct BookmarkService<L: ?Sized, B: ?Sized> {
    listings: Arc<L>,
    bookmarks: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized, B: ?Sized> BookmarkService<L, B> {
    /// Create the service over the listing store and the bookmark store.
    pub fn new(listings: Arc<L>, bookmarks: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            bookmarks,
            clock,
        }
    }
}

impl<L, B> BookmarkService<L, B>
where
    L: ListingRepository + ?Sized,
    B: BookmarkRepository + ?Sized,
{
    async fn listings_by_id(&self, ids: &[ListingId]) -> Result<HashMap<ListingId, Listing>, Error> {
        Ok(self
            .listings
            .find_many(ids)
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect())
    }
}

#[async_trait]
impl<L, B> BookmarksCommand for BookmarkService<L, B>
where
    L: ListingRepository + ?Sized,
    B: BookmarkRepository + ?Sized,
{
    async fn add(&self, caller: &Caller, listing_id: &ListingId) -> Result<BookmarkEntry, Error> {
        require_tenant(caller, "bookmark listings")?;
        if self.listings.find(listing_id).await?.is_none() {
            return Err(Error::not_found(format!("listing {listing_id} not found")));
        }

        let entry = BookmarkEntry {
            listing_id: *listing_id,
            saved_at: self.clock.utc(),
        };
        match self.bookmarks.insert_front(&caller.user_id, &entry).await? {
            BookmarkInsert::Inserted => Ok(entry),
            BookmarkInsert::AlreadyExists => Err(Error::conflict("listing already bookmarked")
                .with_details(json!({ "code": "already_bookmarked" }))),
        }
    }

    async fn remove(&self, caller: &Caller, listing_id: &ListingId) -> Result<(), Error> {
        require_tenant(caller, "bookmark listings")?;
        self.bookmarks.remove(&caller.user_id, listing_id).await?;
        Ok(())
    }

    async fn clear(&self, caller: &Caller) -> Result<u64, Error> {
        require_tenant(caller, "bookmark listings")?;
        Ok(self.bookmarks.clear(&caller.user_id).await?)
    }

    async fn list(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkedListing>, Error> {
        require_tenant(caller, "bookmark listings")?;
        let entries = Paginated::from_ordered(self.bookmarks.list(&caller.user_id).await?, page);
        let ids: Vec<ListingId> = entries.items.iter().map(|entry| entry.listing_id).collect();
        let mut by_id = self.listings_by_id(&ids).await?;
        Ok(entries.map(|entry| BookmarkedListing {
            listing: by_id.remove(&entry.listing_id),
            entry,
        }))
    }

    async fn search(
        &self,
        caller: &Caller,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<Listing>, Error> {
        require_tenant(caller, "bookmark listings")?;
        let criteria = filters.resolve()?;
        let ids: Vec<ListingId> = self
            .bookmarks
            .list(&caller.user_id)
            .await?
            .into_iter()
            .map(|entry| entry.listing_id)
            .collect();

        let mut listings: Vec<Listing> = self.listings_by_id(&ids).await?.into_values().collect();
        listings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        listings.retain(|listing| criteria.matches(listing));
        Ok(Paginated::from_ordered(listings, page))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockable::DefaultClock;

    use super::*;
    use crate::domain::listing::fixtures::{details, listing};
    use crate::domain::{ErrorCode, UserId, UserRole};
    use crate::outbound::memory::{MemoryBookmarkStore, MemoryListingStore};

    struct Harness {
        service: BookmarkService<MemoryListingStore, MemoryBookmarkStore>,
        store: Arc<MemoryListingStore>,
        tenant: Caller,
        ids: Vec<ListingId>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryListingStore::default());
        let owner = UserId::random();
        let mut ids = Vec::new();
        for (minutes, (title, location)) in [("a", "Lekki"), ("b", "Yaba"), ("c", "Lekki")]
            .into_iter()
            .enumerate()
        {
            let item = listing(
                &owner,
                details(title, location, 1, 100),
                i64::try_from(minutes).expect("small index"),
            );
            ids.push(item.id);
            store.insert(&item).await.expect("seed");
        }
        Harness {
            service: BookmarkService::new(
                store.clone(),
                Arc::new(MemoryBookmarkStore::default()),
                Arc::new(DefaultClock),
            ),
            store,
            tenant: Caller::new(UserId::random(), UserRole::Tenant),
            ids,
        }
    }

    #[tokio::test]
    async fn duplicate_add_conflicts_and_keeps_one_entry() {
        let h = harness().await;
        let id = h.ids.first().copied().expect("listing");
        h.service.add(&h.tenant, &id).await.expect("first add");
        let err = h.service.add(&h.tenant, &id).await.expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);

        let listed = h.service.list(&h.tenant, PageRequest::default()).await.expect("list");
        assert_eq!(listed.info.total, 1);
    }

    #[tokio::test]
    async fn list_keeps_most_recent_first_and_marks_missing_listings() {
        let h = harness().await;
        for id in &h.ids {
            h.service.add(&h.tenant, id).await.expect("add");
        }
        let last = h.ids.last().copied().expect("listing");
        h.store.delete(&last).await.expect("delete");

        let listed = h.service.list(&h.tenant, PageRequest::default()).await.expect("list");
        let order: Vec<ListingId> = listed.items.iter().map(|b| b.entry.listing_id).collect();
        let mut expected = h.ids.clone();
        expected.reverse();
        assert_eq!(order, expected);
        assert!(listed.items.first().is_some_and(|b| b.listing.is_none()));
    }

    #[tokio::test]
    async fn remove_is_idempotent_and_clear_empties() {
        let h = harness().await;
        let id = h.ids.first().copied().expect("listing");
        h.service.remove(&h.tenant, &id).await.expect("remove absent");
        h.service.add(&h.tenant, &id).await.expect("add");
        h.service.remove(&h.tenant, &id).await.expect("remove");
        h.service.add(&h.tenant, &id).await.expect("re-add after remove");
        assert_eq!(h.service.clear(&h.tenant).await.expect("clear"), 1);
        let listed = h.service.list(&h.tenant, PageRequest::default()).await.expect("list");
        assert!(listed.items.is_empty());
    }

    #[tokio::test]
    async fn search_drops_missing_and_sorts_by_listing_age() {
        let h = harness().await;
        for id in &h.ids {
            h.service.add(&h.tenant, id).await.expect("add");
        }
        let found = h
            .service
            .search(
                &h.tenant,
                SearchFilters {
                    location: Some("Lekki".to_owned()),
                    ..SearchFilters::default()
                },
                PageRequest::default(),
            )
            .await
            .expect("search");
        let titles: Vec<&str> = found.items.iter().map(|l| l.details.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn non_tenants_are_forbidden() {
        let h = harness().await;
        let landlord = Caller::new(UserId::random(), UserRole::Landlord);
        let id = h.ids.first().copied().expect("listing");
        let err = h.service.add(&landlord, &id).await.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let h = harness().await;
        let err = h
            .service
            .add(&h.tenant, &ListingId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
