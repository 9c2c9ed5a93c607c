//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler under `/api/v1`, the health probes,
//! and the response schemas they reference. Domain types stay free of utoipa
//! derives; error payloads are described by the wrappers in
//! [`crate::inbound::http::schemas`].
//!
//! Swagger UI serves the document in debug builds, and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::bookmarks::{BookmarkResponse, BookmarksResponse, ClearBookmarksResponse};
use crate::inbound::http::health::ProbeBody;
use crate::inbound::http::listings::ViewResponse;
use crate::inbound::http::listings_dto::{
    BrowseResponse, ListingPatchRequest, ListingRequest, ListingResponse, PageMeta, SearchResponse,
};
use crate::inbound::http::moderation::{
    AuditEntryResponse, AuditLogResponse, ReconcileResponse, ReportRequest, ReportResponse,
    ReportsResponse,
};
use crate::inbound::http::notifications::{
    MarkAllReadResponse, NotificationMetaResponse, NotificationResponse, NotificationsResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::user_listings::{DashboardResponse, UserListingsResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie minted by the identity service; carries user id and role.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rentals API",
        description = "Apartment listings, discovery, bookmarks, moderation, and notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::browse_listings,
        crate::inbound::http::listings::search_listings,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::update_listing,
        crate::inbound::http::listings::deactivate_listing,
        crate::inbound::http::listings::reactivate_listing,
        crate::inbound::http::listings::record_view,
        crate::inbound::http::user_listings::list_active,
        crate::inbound::http::user_listings::list_deactivated,
        crate::inbound::http::user_listings::get_user_listing,
        crate::inbound::http::user_listings::search_user_listings,
        crate::inbound::http::user_listings::dashboard,
        crate::inbound::http::bookmarks::list_bookmarks,
        crate::inbound::http::bookmarks::clear_bookmarks,
        crate::inbound::http::bookmarks::search_bookmarks,
        crate::inbound::http::bookmarks::add_bookmark,
        crate::inbound::http::bookmarks::remove_bookmark,
        crate::inbound::http::moderation::report_listing,
        crate::inbound::http::moderation::list_reports,
        crate::inbound::http::moderation::review_report,
        crate::inbound::http::moderation::resolve_report,
        crate::inbound::http::moderation::delete_listing,
        crate::inbound::http::moderation::audit_log,
        crate::inbound::http::moderation::reconcile_index,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ListingRequest,
        ListingPatchRequest,
        ListingResponse,
        BrowseResponse,
        SearchResponse,
        PageMeta,
        ViewResponse,
        UserListingsResponse,
        DashboardResponse,
        BookmarkResponse,
        BookmarksResponse,
        ClearBookmarksResponse,
        ReportRequest,
        ReportResponse,
        ReportsResponse,
        AuditEntryResponse,
        AuditLogResponse,
        ReconcileResponse,
        NotificationMetaResponse,
        NotificationResponse,
        NotificationsResponse,
        MarkAllReadResponse,
        ProbeBody,
    )),
    tags(
        (name = "apartments", description = "Listing lifecycle, browse, search, and views"),
        (name = "user-listings", description = "An owner's own listings"),
        (name = "bookmarks", description = "Tenant bookmarks"),
        (name = "moderation", description = "Reporting listings"),
        (name = "admin", description = "Report review, deletion, audit, and reconciliation"),
        (name = "notifications", description = "Notification inbox"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
