//! Tenant bookmark handlers.
//!
//! ```text
//! GET    /api/v1/bookmarks
//! DELETE /api/v1/bookmarks
//! GET    /api/v1/bookmarks/search
//! POST   /api/v1/bookmarks/{listingId}
//! DELETE /api/v1/bookmarks/{listingId}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookmarkEntry, BookmarkedListing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::{
    ListingResponse, PageMeta, SearchQuery, SearchResponse, parse_listing_id,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// One saved listing. `listing` is null once the listing has been removed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub listing_id: String,
    pub saved_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingResponse>,
}

impl From<BookmarkEntry> for BookmarkResponse {
    fn from(entry: BookmarkEntry) -> Self {
        Self {
            listing_id: entry.listing_id.to_string(),
            saved_at: entry.saved_at.to_rfc3339(),
            listing: None,
        }
    }
}

impl From<BookmarkedListing> for BookmarkResponse {
    fn from(value: BookmarkedListing) -> Self {
        Self {
            listing: value.listing.map(ListingResponse::from),
            ..Self::from(value.entry)
        }
    }
}

/// Saved listings, most recently saved first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarksResponse {
    pub bookmarks: Vec<BookmarkResponse>,
    #[serde(flatten)]
    pub page: PageMeta,
}

/// Number of bookmarks removed by a clear.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearBookmarksResponse {
    pub removed: u64,
}

/// List the caller's bookmarks in saved order.
#[utoipa::path(
    get,
    path = "/api/v1/bookmarks",
    params(PageQuery),
    responses(
        (status = 200, description = "Bookmarks page", body = BookmarksResponse),
        (status = 400, description = "Invalid page", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema)
    ),
    tags = ["bookmarks"],
    operation_id = "listBookmarks"
)]
#[get("/bookmarks")]
pub async fn list_bookmarks(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<BookmarksResponse>> {
    let caller = session.require_caller()?;
    let page = query.to_request()?;
    let found = state.bookmarks.list(&caller, page).await?;
    let pagination::Paginated { items, info } = found;
    Ok(web::Json(BookmarksResponse {
        bookmarks: items.into_iter().map(BookmarkResponse::from).collect(),
        page: PageMeta::from(info),
    }))
}

/// Remove every bookmark the caller holds.
#[utoipa::path(
    delete,
    path = "/api/v1/bookmarks",
    responses(
        (status = 200, description = "Bookmarks cleared", body = ClearBookmarksResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema)
    ),
    tags = ["bookmarks"],
    operation_id = "clearBookmarks"
)]
#[delete("/bookmarks")]
pub async fn clear_bookmarks(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClearBookmarksResponse>> {
    let caller = session.require_caller()?;
    let removed = state.bookmarks.clear(&caller).await?;
    Ok(web::Json(ClearBookmarksResponse { removed }))
}

/// Search the caller's bookmarked listings, newest listing first.
///
/// Deactivated listings stay searchable here.
#[utoipa::path(
    get,
    path = "/api/v1/bookmarks/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema)
    ),
    tags = ["bookmarks"],
    operation_id = "searchBookmarks"
)]
#[get("/bookmarks/search")]
pub async fn search_bookmarks(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchResponse>> {
    let caller = session.require_caller()?;
    let (filters, page) = query.into_inner().parse()?;
    let results = state.bookmarks.search(&caller, filters, page).await?;
    Ok(web::Json(SearchResponse::from(results)))
}

/// Save a listing to the front of the caller's bookmarks.
#[utoipa::path(
    post,
    path = "/api/v1/bookmarks/{listingId}",
    params(("listingId" = String, Path, description = "Listing identifier")),
    responses(
        (status = 201, description = "Bookmark saved", body = BookmarkResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema),
        (status = 404, description = "Listing not found", body = ErrorSchema),
        (status = 409, description = "Already bookmarked", body = ErrorSchema)
    ),
    tags = ["bookmarks"],
    operation_id = "addBookmark"
)]
#[post("/bookmarks/{listing_id}")]
pub async fn add_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let listing_id = parse_listing_id(&path.into_inner())?;
    let entry = state.bookmarks.add(&caller, &listing_id).await?;
    Ok(HttpResponse::Created().json(BookmarkResponse::from(entry)))
}

/// Drop one bookmark; absent bookmarks are not an error.
#[utoipa::path(
    delete,
    path = "/api/v1/bookmarks/{listingId}",
    params(("listingId" = String, Path, description = "Listing identifier")),
    responses(
        (status = 204, description = "Bookmark removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema)
    ),
    tags = ["bookmarks"],
    operation_id = "removeBookmark"
)]
#[delete("/bookmarks/{listing_id}")]
pub async fn remove_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let listing_id = parse_listing_id(&path.into_inner())?;
    state.bookmarks.remove(&caller, &listing_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
