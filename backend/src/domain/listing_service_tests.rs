//! Tests for the listing lifecycle service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;

use super::*;
use crate::domain::listing::fixtures::details;
use crate::domain::ports::{
    ListingIndexRepositoryError, MockListingIndexRepository, MockListingRepository,
};
use crate::domain::{ErrorCode, UserId, UserRole};
use crate::outbound::memory::{MemoryListingIndex, MemoryListingStore};

fn landlord() -> Caller {
    Caller::new(UserId::random(), UserRole::Landlord)
}

fn memory_service() -> (
    ListingService<MemoryListingStore, MemoryListingIndex>,
    Arc<MemoryListingStore>,
    Arc<MemoryListingIndex>,
) {
    let store = Arc::new(MemoryListingStore::default());
    let index = Arc::new(MemoryListingIndex::default());
    let service = ListingService::new(store.clone(), index.clone(), Arc::new(DefaultClock));
    (service, store, index)
}

#[tokio::test]
async fn create_publishes_with_defaults_and_indexes() {
    let (service, store, index) = memory_service();
    let owner = landlord();

    let listing = service
        .create(&owner, details("Cozy flat", "Lekki", 2, 150_000))
        .await
        .expect("publish");

    let stored = store.find(&listing.id).await.expect("find").expect("stored");
    assert!(stored.is_available);
    assert_eq!(stored.views, 0);
    assert_eq!(stored.report_count, 0);

    let entries = index.entries(&owner.user_id).await.expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.first().map(|e| e.listing_id), Some(listing.id));
}

#[rstest]
#[case(UserRole::Tenant)]
#[case(UserRole::Admin)]
#[tokio::test]
async fn create_rejects_non_publishers(#[case] role: UserRole) {
    let (service, _, _) = memory_service();
    let caller = Caller::new(UserId::random(), role);
    let err = service
        .create(&caller, details("Cozy flat", "Lekki", 2, 1))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_rejects_too_many_images() {
    let (service, _, _) = memory_service();
    let mut content = details("Cozy flat", "Lekki", 2, 1);
    content.images = (0..11).map(|i| format!("https://img.example/{i}.jpg")).collect();
    let err = service
        .create(&landlord(), content)
        .await
        .expect_err("too many images");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_survives_index_failure() {
    let mut listings = MockListingRepository::new();
    listings.expect_insert().times(1).return_once(|_| Ok(()));
    let mut index = MockListingIndexRepository::new();
    index
        .expect_append()
        .times(1)
        .return_once(|_| Err(ListingIndexRepositoryError::connection("down")));

    let service = ListingService::new(Arc::new(listings), Arc::new(index), Arc::new(DefaultClock));
    let listing = service
        .create(&landlord(), details("Cozy flat", "Lekki", 2, 1))
        .await
        .expect("primary write wins");
    assert!(listing.is_available);
}

#[tokio::test]
async fn update_merges_patch_for_owner_only() {
    let (service, _, _) = memory_service();
    let owner = landlord();
    let listing = service
        .create(&owner, details("Cozy flat", "Lekki", 2, 100))
        .await
        .expect("publish");

    let patch = ListingPatch {
        price: Some(120),
        ..ListingPatch::default()
    };
    let updated = service
        .update(&owner, &listing.id, patch.clone())
        .await
        .expect("owner update");
    assert_eq!(updated.details.price, 120);
    assert_eq!(updated.details.title, "Cozy flat");
    assert!(updated.updated_at >= listing.updated_at);

    let err = service
        .update(&landlord(), &listing.id, patch)
        .await
        .expect_err("stranger");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_unknown_listing_is_not_found() {
    let (service, _, _) = memory_service();
    let err = service
        .update(&landlord(), &ListingId::random(), ListingPatch::default())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn deactivate_then_reactivate_restores_availability_only() {
    let (service, _, _) = memory_service();
    let owner = landlord();
    let listing = service
        .create(&owner, details("Cozy flat", "Lekki", 2, 100))
        .await
        .expect("publish");

    let hidden = service
        .set_availability(&owner, &listing.id, Availability::Deactivated)
        .await
        .expect("deactivate");
    assert!(!hidden.is_available);

    let again = service
        .set_availability(&owner, &listing.id, Availability::Deactivated)
        .await
        .expect_err("already deactivated");
    assert_eq!(again.code(), ErrorCode::Conflict);

    let restored = service
        .set_availability(&owner, &listing.id, Availability::Available)
        .await
        .expect("reactivate");
    assert!(restored.is_available);
    assert_eq!(restored.details, listing.details);
    assert_eq!(restored.views, listing.views);
    assert_eq!(restored.created_at, listing.created_at);
    assert!(restored.updated_at >= Utc::now() - chrono::Duration::minutes(1));
}
