//! Behaviour tests for keyword search.
//!
//! Listings are published over HTTP and searched anonymously so the keyword
//! parser, the filter pipeline, and the visibility rules run end to end.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// The shared harness carries helpers other suites use.
#[allow(dead_code)]
#[path = "support/harness.rs"]
mod harness;

use actix_web::http::Method;
use harness::{WorldFixture, listing_payload, login_as, request};
use rentals::domain::UserRole;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

const LANDLORD: &str = "landlord";

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

#[given("a landlord is signed in")]
fn a_landlord_is_signed_in(world: &WorldFixture) {
    login_as(&world.world(), LANDLORD, UserRole::Landlord);
}

#[given(
    "the landlord publishes a {kind} titled {title} in {location} with {bedrooms} bedrooms for {price}"
)]
fn the_landlord_publishes(
    world: &WorldFixture,
    kind: String,
    title: String,
    location: String,
    bedrooms: u32,
    price: u64,
) {
    let shared = world.world();
    let response = request(
        &shared,
        Some(LANDLORD),
        Method::POST,
        "/api/v1/apartments",
        Some(listing_payload(&title, &location, &kind, bedrooms, price)),
    );
    assert_eq!(response.status, 201, "create failed: {}", response.body);
    let id = response
        .body
        .get("id")
        .and_then(Value::as_str)
        .expect("listing id")
        .to_owned();
    shared.borrow_mut().listings.insert(title, id);
}

#[given("the landlord deactivates {title}")]
fn the_landlord_deactivates(world: &WorldFixture, title: String) {
    let shared = world.world();
    let id = shared
        .borrow()
        .listings
        .get(&title)
        .cloned()
        .expect("published listing");
    let response = request(
        &shared,
        Some(LANDLORD),
        Method::PATCH,
        &format!("/api/v1/apartments/{id}/deactivate"),
        None,
    );
    assert_eq!(response.status, 200, "deactivate failed: {}", response.body);
}

#[when("a visitor searches for \"{keyword}\"")]
fn a_visitor_searches_for(world: &WorldFixture, keyword: String) {
    let encoded = keyword.split_whitespace().collect::<Vec<_>>().join("+");
    request(
        &world.world(),
        None,
        Method::GET,
        &format!("/api/v1/apartments/search?keyword={encoded}"),
        None,
    );
}

fn results(world: &WorldFixture) -> Vec<Value> {
    let shared = world.world();
    let ctx = shared.borrow();
    let last = ctx.last.as_ref().expect("search response");
    assert_eq!(last.status, 200, "search failed: {}", last.body);
    last.body
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .expect("results array")
}

#[then("the search returns {count} results")]
fn the_search_returns(world: &WorldFixture, count: usize) {
    assert_eq!(results(world).len(), count);
}

#[then("the first result is titled {title}")]
fn the_first_result_is_titled(world: &WorldFixture, title: String) {
    let found = results(world);
    let first = found.first().expect("at least one result");
    assert_eq!(first.get("title").and_then(Value::as_str), Some(title.as_str()));
}

#[scenario(
    path = "tests/features/keyword_search.feature",
    name = "Bedroom count in the keyword narrows the results"
)]
fn bedroom_count_in_the_keyword_narrows_the_results(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/keyword_search.feature",
    name = "Apartment type words become a type filter"
)]
fn apartment_type_words_become_a_type_filter(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/keyword_search.feature",
    name = "A studio keyword means zero bedrooms"
)]
fn a_studio_keyword_means_zero_bedrooms(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/keyword_search.feature",
    name = "Deactivated listings drop out of search"
)]
fn deactivated_listings_drop_out_of_search(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/keyword_search.feature",
    name = "An unmatched keyword returns an empty page"
)]
fn an_unmatched_keyword_returns_an_empty_page(world: WorldFixture) {
    drop(world);
}
