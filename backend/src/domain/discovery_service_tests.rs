//! Tests for the discovery service over the in-memory listing store.

use std::collections::HashSet;
use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::listing::fixtures::{details, listing};
use crate::domain::ports::{ListingPage, MockListingRepository};
use crate::domain::{ErrorCode, UserId, UserRole};
use crate::outbound::memory::MemoryListingStore;

async fn seeded(listings: Vec<Listing>) -> DiscoveryService<MemoryListingStore> {
    let store = Arc::new(MemoryListingStore::default());
    for item in &listings {
        store.insert(item).await.expect("seed");
    }
    DiscoveryService::new(store)
}

fn page(page: u32, limit: u32) -> PageRequest {
    PageRequest::new(page, limit).expect("valid page")
}

#[tokio::test]
async fn browse_recent_hides_unavailable_and_reports_has_more() {
    let owner = UserId::random();
    let mut hidden = listing(&owner, details("hidden", "Lekki", 1, 1), 30);
    hidden.is_available = false;
    let listings = vec![
        listing(&owner, details("old", "Lekki", 1, 1), 0),
        listing(&owner, details("mid", "Yaba", 1, 1), 10),
        listing(&owner, details("new", "Ikeja", 1, 1), 20),
        hidden,
    ];
    let service = seeded(listings).await;

    let first = service
        .browse(BrowseSort::Recent, page(1, 2))
        .await
        .expect("browse");
    let titles: Vec<&str> = first.items.iter().map(|l| l.details.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "mid"]);
    assert_eq!(first.info.total, 3);
    assert!(first.info.has_more);

    let second = service
        .browse(BrowseSort::Recent, page(2, 2))
        .await
        .expect("browse");
    assert_eq!(second.items.len(), 1);
    assert!(!second.info.has_more);
}

#[tokio::test]
async fn browse_popular_runs_location_pre_pass() {
    let owner = UserId::random();
    let service = seeded(vec![
        listing(&owner, details("y", "Yaba", 1, 1), 50),
        listing(&owner, details("l1", "Lekki", 1, 1), 0),
        listing(&owner, details("l2", "Lekki", 1, 1), 10),
    ])
    .await;

    let popular = service
        .browse(BrowseSort::Popular, page(1, 10))
        .await
        .expect("browse");
    let titles: Vec<&str> = popular.items.iter().map(|l| l.details.title.as_str()).collect();
    assert_eq!(titles, vec!["l2", "l1", "y"]);
}

#[tokio::test]
async fn browse_random_returns_every_eligible_listing_once() {
    let owner = UserId::random();
    let listings: Vec<Listing> = (0..8)
        .map(|i| listing(&owner, details(&format!("t{i}"), "Lekki", 1, 1), i))
        .collect();
    let expected: HashSet<ListingId> = listings.iter().map(|l| l.id).collect();
    let service = seeded(listings).await;

    let random = service
        .browse(BrowseSort::Random, page(1, 50))
        .await
        .expect("browse");
    let seen: HashSet<ListingId> = random.items.iter().map(|l| l.id).collect();
    assert_eq!(seen, expected);
    assert_eq!(random.info.total, 8);
}

#[tokio::test]
async fn empty_search_is_a_successful_empty_page() {
    let service = seeded(Vec::new()).await;
    let result = service
        .search(
            SearchFilters {
                min_price: Some(100_000),
                max_price: Some(300_000),
                ..SearchFilters::default()
            },
            page(1, 10),
        )
        .await
        .expect("search");
    assert!(result.items.is_empty());
    assert_eq!(result.info.total_pages, 0);
}

#[tokio::test]
async fn inverted_price_range_is_invalid() {
    let mut store = MockListingRepository::new();
    store.expect_search().never();
    let service = DiscoveryService::new(Arc::new(store));
    let err = service
        .search(
            SearchFilters {
                min_price: Some(5),
                max_price: Some(1),
                ..SearchFilters::default()
            },
            page(1, 10),
        )
        .await
        .expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn search_passes_resolved_criteria_to_the_store() {
    let mut store = MockListingRepository::new();
    store
        .expect_search()
        .withf(|criteria, _| criteria.bedrooms == Some(2) && criteria.text.is_some())
        .times(1)
        .return_once(|_, _| Ok(ListingPage::default()));
    let service = DiscoveryService::new(Arc::new(store));
    service
        .search(
            SearchFilters {
                keyword: Some("2 bedroom lekki".to_owned()),
                ..SearchFilters::default()
            },
            page(1, 10),
        )
        .await
        .expect("search");
}

#[rstest]
#[case(None, false)]
#[case(Some(UserRole::Tenant), false)]
#[case(Some(UserRole::Admin), true)]
#[tokio::test]
async fn deactivated_listing_visibility(#[case] role: Option<UserRole>, #[case] visible: bool) {
    let owner = UserId::random();
    let mut hidden = listing(&owner, details("hidden", "Lekki", 1, 1), 0);
    hidden.is_available = false;
    let id = hidden.id;
    let service = seeded(vec![hidden]).await;

    let caller = role.map(|r| Caller::new(UserId::random(), r));
    assert_eq!(service.get(caller, &id).await.is_ok(), visible);

    let as_owner = Caller::new(owner, UserRole::Landlord);
    assert!(service.get(Some(as_owner), &id).await.is_ok());
}
