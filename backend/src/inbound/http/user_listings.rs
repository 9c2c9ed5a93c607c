//! Per-user listing handlers.
//!
//! ```text
//! GET /api/v1/user-listings/{userId}
//! GET /api/v1/user-listings/{userId}/deactivated
//! GET /api/v1/user-listings/{userId}/apartments/{listingId}
//! GET /api/v1/user-listings/{userId}/search/{scope}
//! GET /api/v1/user-listings/{userId}/dashboard
//! ```
//!
//! Every route is restricted to the user named in the path.

use actix_web::{get, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, IndexScope, Listing, ListingDashboard, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::{
    ListingResponse, SearchQuery, SearchResponse, parse_listing_id,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, invalid_enum_error, parse_uuid};

/// Envelope for a user's own listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListingsResponse {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_listings: u64,
    pub listings_per_page: u32,
    pub listings: Vec<ListingResponse>,
}

impl From<Paginated<Listing>> for UserListingsResponse {
    fn from(page: Paginated<Listing>) -> Self {
        let Paginated { items, info } = page;
        Self {
            current_page: info.page,
            total_pages: info.total_pages,
            total_listings: info.total,
            listings_per_page: info.limit,
            listings: items.into_iter().map(ListingResponse::from).collect(),
        }
    }
}

/// Owner dashboard counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_listings: u64,
    pub active_listings: u64,
    pub deactivated_listings: u64,
}

impl From<ListingDashboard> for DashboardResponse {
    fn from(value: ListingDashboard) -> Self {
        Self {
            total_listings: value.total_listings,
            active_listings: value.active_listings,
            deactivated_listings: value.deactivated_listings,
        }
    }
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    parse_uuid(raw, FieldName::new("userId")).map(UserId::from_uuid)
}

fn parse_scope(raw: &str) -> Result<IndexScope, Error> {
    match raw {
        "active" => Ok(IndexScope::Active),
        "deactivated" => Ok(IndexScope::Deactivated),
        other => Err(invalid_enum_error(
            FieldName::new("scope"),
            other,
            "active, deactivated",
        )),
    }
}

async fn list_scope(
    state: &HttpState,
    session: &SessionContext,
    raw_user: &str,
    scope: IndexScope,
    query: &PageQuery,
) -> ApiResult<web::Json<UserListingsResponse>> {
    let caller = session.require_caller()?;
    let user_id = parse_user_id(raw_user)?;
    let page = query.to_request()?;
    let listings = state
        .user_listings
        .list(&caller, &user_id, scope, page)
        .await?;
    Ok(web::Json(UserListingsResponse::from(listings)))
}

/// The user's available listings, newest post first.
#[utoipa::path(
    get,
    path = "/api/v1/user-listings/{userId}",
    params(("userId" = String, Path, description = "Owner identifier"), PageQuery),
    responses(
        (status = 200, description = "Active listings", body = UserListingsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema)
    ),
    tags = ["user-listings"],
    operation_id = "listActiveUserListings"
)]
#[get("/user-listings/{user_id}")]
pub async fn list_active(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<UserListingsResponse>> {
    list_scope(&state, &session, &path, IndexScope::Active, &query).await
}

/// The user's deactivated listings, newest post first.
#[utoipa::path(
    get,
    path = "/api/v1/user-listings/{userId}/deactivated",
    params(("userId" = String, Path, description = "Owner identifier"), PageQuery),
    responses(
        (status = 200, description = "Deactivated listings", body = UserListingsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema)
    ),
    tags = ["user-listings"],
    operation_id = "listDeactivatedUserListings"
)]
#[get("/user-listings/{user_id}/deactivated")]
pub async fn list_deactivated(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<UserListingsResponse>> {
    list_scope(&state, &session, &path, IndexScope::Deactivated, &query).await
}

/// One of the user's own listings, in either state.
#[utoipa::path(
    get,
    path = "/api/v1/user-listings/{userId}/apartments/{listingId}",
    params(
        ("userId" = String, Path, description = "Owner identifier"),
        ("listingId" = String, Path, description = "Listing identifier")
    ),
    responses(
        (status = 200, description = "Listing", body = ListingResponse),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not in the user's index", body = ErrorSchema)
    ),
    tags = ["user-listings"],
    operation_id = "getUserListing"
)]
#[get("/user-listings/{user_id}/apartments/{listing_id}")]
pub async fn get_user_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ListingResponse>> {
    let caller = session.require_caller()?;
    let (raw_user, raw_listing) = path.into_inner();
    let user_id = parse_user_id(&raw_user)?;
    let listing_id = parse_listing_id(&raw_listing)?;
    let listing = state
        .user_listings
        .get(&caller, &user_id, &listing_id)
        .await?;
    Ok(web::Json(ListingResponse::from(listing)))
}

/// Search within the user's active or deactivated listings.
#[utoipa::path(
    get,
    path = "/api/v1/user-listings/{userId}/search/{scope}",
    params(
        ("userId" = String, Path, description = "Owner identifier"),
        ("scope" = String, Path, description = "`active` or `deactivated`"),
        SearchQuery
    ),
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema)
    ),
    tags = ["user-listings"],
    operation_id = "searchUserListings"
)]
#[get("/user-listings/{user_id}/search/{scope}")]
pub async fn search_user_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchResponse>> {
    let caller = session.require_caller()?;
    let (raw_user, raw_scope) = path.into_inner();
    let user_id = parse_user_id(&raw_user)?;
    let scope = parse_scope(&raw_scope)?;
    let (filters, page) = query.into_inner().parse()?;
    let results = state
        .user_listings
        .search(&caller, &user_id, scope, filters, page)
        .await?;
    Ok(web::Json(SearchResponse::from(results)))
}

/// Listing counts for the owner's dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/user-listings/{userId}/dashboard",
    params(("userId" = String, Path, description = "Owner identifier")),
    responses(
        (status = 200, description = "Counters", body = DashboardResponse),
        (status = 403, description = "Not the owner", body = ErrorSchema)
    ),
    tags = ["user-listings"],
    operation_id = "userListingDashboard"
)]
#[get("/user-listings/{user_id}/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DashboardResponse>> {
    let caller = session.require_caller()?;
    let user_id = parse_user_id(&path.into_inner())?;
    let counters = state.user_listings.dashboard(&caller, &user_id).await?;
    Ok(web::Json(DashboardResponse::from(counters)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use super::*;
    use crate::domain::UserRole;
    use crate::inbound::http::test_utils::{
        caller, listing_json, login, memory_state, test_app, test_clock,
    };

    #[actix_web::test]
    async fn owner_sees_split_views_and_dashboard() {
        let app = test::init_service(test_app(memory_state(test_clock()))).await;
        let owner = caller(UserRole::Landlord);
        let cookie = login(&app, &owner).await;

        let mut ids = Vec::new();
        for title in ["First", "Second", "Third"] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/apartments")
                    .cookie(cookie.clone())
                    .set_json(listing_json(title, "Yaba", 1, 100_000))
                    .to_request(),
            )
            .await;
            let body: Value = test::read_body_json(res).await;
            ids.push(body["id"].as_str().expect("id").to_owned());
        }
        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/apartments/{}/deactivate", ids[0]))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let base = format!("/api/v1/user-listings/{}", owner.user_id);
        let active: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("{base}?limit=1"))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(active["totalListings"], 2);
        assert_eq!(active["totalPages"], 2);
        assert_eq!(active["listingsPerPage"], 1);
        assert_eq!(active["currentPage"], 1);

        let deactivated: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("{base}/deactivated"))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(deactivated["listings"][0]["title"], "First");

        let counters: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("{base}/dashboard"))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(counters["totalListings"], 3);
        assert_eq!(counters["activeListings"], 2);
        assert_eq!(counters["deactivatedListings"], 1);

        let found: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("{base}/search/deactivated?title=fir"))
                    .cookie(cookie)
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(found["total"], 1);
    }

    #[actix_web::test]
    async fn other_users_are_forbidden() {
        let app = test::init_service(test_app(memory_state(test_clock()))).await;
        let cookie = login(&app, &caller(UserRole::Landlord)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/user-listings/{}", UserId::random()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_search_scope_is_invalid() {
        let owner = caller(UserRole::Agent);
        let app = test::init_service(test_app(memory_state(test_clock()))).await;
        let cookie = login(&app, &owner).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/user-listings/{}/search/archived",
                    owner.user_id
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "scope");
    }
}
