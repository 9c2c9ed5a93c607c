//! Diesel adapters against embedded PostgreSQL.
//!
//! Each test provisions its own migrated database, so the SQL that only
//! PostgreSQL evaluates (`ILIKE` OR-chains, `array_position`, `GREATEST`,
//! `ON CONFLICT`, transactions) runs for real rather than through the
//! in-memory adapters.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pagination::PageRequest;
use rentals::domain::discovery::{BrowsePlan, LocationRanking, SearchFilters};
use rentals::domain::ports::{
    BookmarkRepository, ListingIndexRepository, ListingRepository, ReportInsert,
    ReportRepository, ViewLogRepository,
};
use rentals::domain::{
    ApartmentType, Availability, BookmarkEntry, BookmarkInsert, Listing, ListingDetails,
    ListingId, PaymentFrequency, Report, ReportReason, ReportStatus, UserId, UserRole,
    ViewRecord, Viewer,
};
use rentals::outbound::persistence::{
    DieselBookmarkRepository, DieselListingIndexRepository, DieselListingRepository,
    DieselReportRepository, DieselViewLogRepository,
};
use rstest::{fixture, rstest};

use embedded_postgres::{PgDatabase, migrated_database};

#[fixture]
fn database() -> Option<PgDatabase> {
    migrated_database()
}

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid base timestamp")
        + Duration::minutes(minutes)
}

fn details(
    title: &str,
    location: &str,
    apartment_type: ApartmentType,
    bedrooms: u32,
    price: u64,
) -> ListingDetails {
    ListingDetails {
        title: title.to_owned(),
        description: None,
        apartment_type,
        price,
        payment_frequency: PaymentFrequency::Yearly,
        duration: "1 year".to_owned(),
        location: location.to_owned(),
        address: format!("4 {location} Way"),
        nearest_landmark: None,
        images: vec!["https://img.example/front.jpg".to_owned()],
        contact_phone: "+2348000000000".to_owned(),
        amenities: vec!["water".to_owned()],
        bedrooms,
        bathrooms: 1,
        size: None,
        furnished: false,
        service_charge: 0,
    }
}

fn published(owner: &UserId, details: ListingDetails, minutes: i64) -> Listing {
    Listing::publish(
        ListingId::random(),
        owner.clone(),
        UserRole::Landlord,
        details,
        at(minutes),
    )
}

/// Palm Court, Sabo Loft, and Marina House in publication order.
fn seed_market(db: &PgDatabase, repo: &DieselListingRepository) -> Vec<Listing> {
    let owner = UserId::random();
    let listings = vec![
        published(
            &owner,
            details("Palm Court", "Lekki", ApartmentType::TwoBedroom, 2, 1_500_000),
            0,
        ),
        published(
            &owner,
            details("Sabo Loft", "Yaba", ApartmentType::Studio, 0, 600_000),
            10,
        ),
        published(
            &owner,
            details("Marina House", "Lekki", ApartmentType::Duplex, 5, 9_000_000),
            20,
        ),
    ];
    db.block_on(async {
        for listing in &listings {
            repo.insert(listing).await.expect("insert listing");
        }
    });
    listings
}

fn titles(items: &[Listing]) -> Vec<&str> {
    items.iter().map(|l| l.details.title.as_str()).collect()
}

#[rstest]
fn publishing_writes_the_listing_and_its_index_row(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let listings = DieselListingRepository::new(db.pool.clone());
    let index = DieselListingIndexRepository::new(db.pool.clone());
    let owner = UserId::random();
    let listing = published(
        &owner,
        details("Palm Court", "Lekki", ApartmentType::TwoBedroom, 2, 1_500_000),
        0,
    );

    db.block_on(async {
        listings.insert(&listing).await.expect("insert listing");
        let stored = listings
            .find(&listing.id)
            .await
            .expect("find")
            .expect("listing stored");
        assert_eq!(stored.details, listing.details);
        assert_eq!(stored.created_at, listing.created_at);

        let entries = index.entries(&owner).await.expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().map(|e| e.listing_id), Some(listing.id));

        // A second insert of the same id fails and leaves the index unchanged.
        assert!(listings.insert(&listing).await.is_err());
        assert_eq!(index.entries(&owner).await.expect("entries").len(), 1);
    });
}

#[rstest]
fn keyword_words_match_independently_and_skip_deactivated(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    let seeded = seed_market(&db, &repo);
    let palm = seeded.first().map(|l| l.id).expect("palm court");

    let criteria = SearchFilters {
        keyword: Some("lekki yaba".to_owned()),
        ..SearchFilters::default()
    }
    .resolve()
    .expect("criteria");

    db.block_on(async {
        let page = repo
            .search(&criteria, PageRequest::default())
            .await
            .expect("search");
        assert_eq!(page.total, 3);
        assert_eq!(
            titles(&page.items),
            vec!["Marina House", "Sabo Loft", "Palm Court"]
        );

        repo.set_availability(&palm, Availability::Deactivated, at(30))
            .await
            .expect("deactivate");
        let page = repo
            .search(&criteria, PageRequest::default())
            .await
            .expect("search");
        assert_eq!(titles(&page.items), vec!["Marina House", "Sabo Loft"]);
    });
}

#[rstest]
fn keyword_type_and_bedrooms_become_filters(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    seed_market(&db, &repo);

    let duplex = SearchFilters {
        keyword: Some("duplex lekki".to_owned()),
        ..SearchFilters::default()
    }
    .resolve()
    .expect("criteria");
    let two_bed = SearchFilters {
        keyword: Some("2 bedroom lekki".to_owned()),
        ..SearchFilters::default()
    }
    .resolve()
    .expect("criteria");

    db.block_on(async {
        let page = repo.search(&duplex, PageRequest::default()).await.expect("search");
        assert_eq!(titles(&page.items), vec!["Marina House"]);
        let page = repo.search(&two_bed, PageRequest::default()).await.expect("search");
        assert_eq!(titles(&page.items), vec!["Palm Court"]);
    });
}

#[rstest]
#[case::cheapest_first(Some(1), None, vec!["Sabo Loft", "Palm Court", "Marina House"])]
#[case::dearest_first(None, Some(10_000_000), vec!["Marina House", "Palm Court", "Sabo Loft"])]
fn price_bounds_pick_the_sort(
    database: Option<PgDatabase>,
    #[case] min_price: Option<u64>,
    #[case] max_price: Option<u64>,
    #[case] expected: Vec<&str>,
) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    seed_market(&db, &repo);
    let criteria = SearchFilters {
        min_price,
        max_price,
        ..SearchFilters::default()
    }
    .resolve()
    .expect("criteria");

    let page = db
        .block_on(repo.search(&criteria, PageRequest::default()))
        .expect("search");
    assert_eq!(titles(&page.items), expected);
}

#[rstest]
fn explicit_bedroom_filter_matches_exactly(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    seed_market(&db, &repo);
    let criteria = SearchFilters {
        bedrooms: Some(0),
        ..SearchFilters::default()
    }
    .resolve()
    .expect("criteria");

    let page = db
        .block_on(repo.search(&criteria, PageRequest::default()))
        .expect("search");
    assert_eq!(titles(&page.items), vec!["Sabo Loft"]);
}

#[rstest]
fn popular_browse_ranks_the_busiest_location_first(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    seed_market(&db, &repo);

    db.block_on(async {
        let frequencies = repo.location_frequencies().await.expect("frequencies");
        let plan = BrowsePlan::Popular(LocationRanking::new(frequencies));
        let page = repo
            .browse(&plan, PageRequest::default())
            .await
            .expect("browse");
        assert_eq!(page.total, 3);
        assert_eq!(
            titles(&page.items),
            vec!["Marina House", "Palm Court", "Sabo Loft"]
        );
    });
}

#[rstest]
fn recent_views_match_on_user_or_address(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let listings = DieselListingRepository::new(db.pool.clone());
    let views = DieselViewLogRepository::new(db.pool.clone());
    let listing = seed_market(&db, &listings)
        .into_iter()
        .next()
        .expect("listing");
    let visitor = UserId::random();
    let record = ViewRecord {
        listing_id: listing.id,
        viewer: Viewer::new(Some(visitor.clone()), "10.0.0.1"),
        viewed_at: at(60),
    };

    db.block_on(async {
        views.insert(&record).await.expect("record view");
        let since = at(30);
        let same_user_new_address = Viewer::new(Some(visitor.clone()), "10.0.0.9");
        let anonymous_same_address = Viewer::new(None, "10.0.0.1");
        let stranger = Viewer::new(Some(UserId::random()), "10.0.0.2");

        assert!(views.has_recent(&listing.id, &same_user_new_address, since).await.expect("lookup"));
        assert!(views.has_recent(&listing.id, &anonymous_same_address, since).await.expect("lookup"));
        assert!(!views.has_recent(&listing.id, &stranger, since).await.expect("lookup"));
        assert!(!views
            .has_recent(&listing.id, &same_user_new_address, at(90))
            .await
            .expect("lookup"));
    });
}

#[rstest]
fn report_count_never_drops_below_zero(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let repo = DieselListingRepository::new(db.pool.clone());
    let listing = seed_market(&db, &repo).into_iter().next().expect("listing");

    db.block_on(async {
        assert_eq!(repo.adjust_report_count(&listing.id, 1).await.expect("up"), Some(1));
        assert_eq!(repo.adjust_report_count(&listing.id, -1).await.expect("down"), Some(0));
        assert_eq!(repo.adjust_report_count(&listing.id, -1).await.expect("floor"), Some(0));
        assert_eq!(
            repo.adjust_report_count(&ListingId::random(), 1).await.expect("missing"),
            None
        );
    });
}

#[rstest]
fn duplicate_bookmarks_leave_one_entry_newest_first(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let listings = DieselListingRepository::new(db.pool.clone());
    let bookmarks = DieselBookmarkRepository::new(db.pool.clone());
    let seeded = seed_market(&db, &listings);
    let tenant = UserId::random();
    let first = BookmarkEntry {
        listing_id: seeded.first().map(|l| l.id).expect("first"),
        saved_at: at(40),
    };
    let second = BookmarkEntry {
        listing_id: seeded.get(1).map(|l| l.id).expect("second"),
        saved_at: at(50),
    };

    db.block_on(async {
        assert_eq!(
            bookmarks.insert_front(&tenant, &first).await.expect("insert"),
            BookmarkInsert::Inserted
        );
        assert_eq!(
            bookmarks.insert_front(&tenant, &first).await.expect("insert"),
            BookmarkInsert::AlreadyExists
        );
        assert_eq!(
            bookmarks.insert_front(&tenant, &second).await.expect("insert"),
            BookmarkInsert::Inserted
        );

        let saved: Vec<ListingId> = bookmarks
            .list(&tenant)
            .await
            .expect("list")
            .into_iter()
            .map(|entry| entry.listing_id)
            .collect();
        assert_eq!(saved, vec![second.listing_id, first.listing_id]);
    });
}

#[rstest]
fn second_report_from_one_tenant_is_rejected(database: Option<PgDatabase>) {
    let Some(db) = database else { return };
    let listings = DieselListingRepository::new(db.pool.clone());
    let reports = DieselReportRepository::new(db.pool.clone());
    let listing = seed_market(&db, &listings).into_iter().next().expect("listing");
    let reason = ReportReason::new("Photos do not match the property").expect("reason");
    let tenant = UserId::random();

    db.block_on(async {
        let filed = Report::file(listing.id, tenant.clone(), reason.clone(), at(40));
        assert_eq!(reports.insert(&filed).await.expect("insert"), ReportInsert::Inserted);

        let again = Report::file(listing.id, tenant.clone(), reason.clone(), at(41));
        assert_eq!(
            reports.insert(&again).await.expect("insert"),
            ReportInsert::AlreadyReported
        );

        let other = Report::file(listing.id, UserId::random(), reason, at(42));
        assert_eq!(reports.insert(&other).await.expect("insert"), ReportInsert::Inserted);

        let (pending, total) = reports
            .list(Some(ReportStatus::Pending), PageRequest::default())
            .await
            .expect("list");
        assert_eq!(total, 2);
        assert_eq!(pending.len(), 2);
    });
}
