//! Listing HTTP handlers.
//!
//! ```text
//! POST  /api/v1/apartments
//! GET   /api/v1/apartments?page&limit&sort
//! GET   /api/v1/apartments/search
//! GET   /api/v1/apartments/{id}
//! PATCH /api/v1/apartments/{id}
//! PATCH /api/v1/apartments/{id}/deactivate
//! PATCH /api/v1/apartments/{id}/reactivate
//! PUT   /api/v1/apartments/{id}/view
//! ```

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::discovery::BrowseSort;
use crate::domain::{Availability, ListingDetails, ListingPatch, UNKNOWN_VIEWER_ADDRESS, Viewer};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::{
    BrowseQuery, BrowseResponse, ListingPatchRequest, ListingRequest, ListingResponse,
    SearchQuery, SearchResponse, parse_listing_id,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_page;

/// Result of a view request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    /// Whether this request incremented the counter.
    pub recorded: bool,
    /// Counter after the request.
    pub views: u64,
}

/// Publish a listing as the session caller.
#[utoipa::path(
    post,
    path = "/api/v1/apartments",
    request_body = ListingRequest,
    responses(
        (status = 201, description = "Listing published", body = ListingResponse),
        (status = 400, description = "Invalid listing", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller may not publish", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "createListing"
)]
#[post("/apartments")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ListingRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let details = ListingDetails::try_from(payload.into_inner())?;
    let listing = state.listings.create(&caller, details).await?;
    Ok(HttpResponse::Created().json(ListingResponse::from(listing)))
}

/// Page through available listings.
///
/// `random` ordering is sampled per request, so successive pages may repeat
/// or skip items.
#[utoipa::path(
    get,
    path = "/api/v1/apartments",
    params(BrowseQuery),
    responses(
        (status = 200, description = "Listings page", body = BrowseResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "browseListings"
)]
#[get("/apartments")]
pub async fn browse_listings(
    state: web::Data<HttpState>,
    query: web::Query<BrowseQuery>,
) -> ApiResult<web::Json<BrowseResponse>> {
    let query = query.into_inner();
    let page = parse_page(query.page.as_deref(), query.limit.as_deref())?;
    let sort = match query.sort.as_deref() {
        None | Some("") => BrowseSort::default(),
        Some(raw) => BrowseSort::from_str(raw)?,
    };
    let listings = state.listings_query.browse(sort, page).await?;
    Ok(web::Json(BrowseResponse::from(listings)))
}

/// Search available listings.
#[utoipa::path(
    get,
    path = "/api/v1/apartments/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results, possibly empty", body = SearchResponse),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "searchListings"
)]
#[get("/apartments/search")]
pub async fn search_listings(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchResponse>> {
    let (filters, page) = query.into_inner().parse()?;
    let results = state.listings_query.search(filters, page).await?;
    Ok(web::Json(SearchResponse::from(results)))
}

/// Fetch one listing.
///
/// Deactivated listings are visible to their owner and administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/apartments/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing", body = ListingResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "getListing"
)]
#[get("/apartments/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingResponse>> {
    let id = parse_listing_id(&path.into_inner())?;
    let caller = session.caller()?;
    let listing = state.listings_query.get(caller, &id).await?;
    Ok(web::Json(ListingResponse::from(listing)))
}

/// Apply a partial update to the caller's listing.
#[utoipa::path(
    patch,
    path = "/api/v1/apartments/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = ListingPatchRequest,
    responses(
        (status = 200, description = "Updated listing", body = ListingResponse),
        (status = 400, description = "Invalid patch", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "updateListing"
)]
#[patch("/apartments/{id}")]
pub async fn update_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ListingPatchRequest>,
) -> ApiResult<web::Json<ListingResponse>> {
    let caller = session.require_caller()?;
    let id = parse_listing_id(&path.into_inner())?;
    let patch = ListingPatch::try_from(payload.into_inner())?;
    let listing = state.listings.update(&caller, &id, patch).await?;
    Ok(web::Json(ListingResponse::from(listing)))
}

async fn change_availability(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    target: Availability,
) -> ApiResult<web::Json<ListingResponse>> {
    let caller = session.require_caller()?;
    let id = parse_listing_id(raw_id)?;
    let listing = state.listings.set_availability(&caller, &id, target).await?;
    Ok(web::Json(ListingResponse::from(listing)))
}

/// Hide the caller's listing from browse and search.
#[utoipa::path(
    patch,
    path = "/api/v1/apartments/{id}/deactivate",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Deactivated listing", body = ListingResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already deactivated", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "deactivateListing"
)]
#[patch("/apartments/{id}/deactivate")]
pub async fn deactivate_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingResponse>> {
    change_availability(&state, &session, &path, Availability::Deactivated).await
}

/// Make the caller's listing visible again.
#[utoipa::path(
    patch,
    path = "/api/v1/apartments/{id}/reactivate",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Reactivated listing", body = ListingResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already active", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "reactivateListing"
)]
#[patch("/apartments/{id}/reactivate")]
pub async fn reactivate_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingResponse>> {
    change_availability(&state, &session, &path, Availability::Available).await
}

/// Count a view, once per viewer per day.
///
/// The viewer is the session user when present, else the client address as
/// seen through `Forwarded`/`X-Forwarded-For`.
#[utoipa::path(
    put,
    path = "/api/v1/apartments/{id}/view",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "View outcome", body = ViewResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["apartments"],
    operation_id = "recordListingView"
)]
#[put("/apartments/{id}/view")]
pub async fn record_view(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<ViewResponse>> {
    let id = parse_listing_id(&path.into_inner())?;
    let user_id = session.caller()?.map(|caller| caller.user_id);
    let address = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or(UNKNOWN_VIEWER_ADDRESS)
        .to_owned();
    let outcome = state.views.record(&id, Viewer::new(user_id, address)).await?;
    Ok(web::Json(ViewResponse {
        recorded: outcome.recorded,
        views: outcome.views,
    }))
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
