//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the listing marketplace core in transport-agnostic
//! terms. Inbound adapters call the services through the driving ports in
//! [`ports`]; outbound adapters implement the driven ports.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: API error payload and stable identifiers.
//! - [`Listing`] and friends: the listing aggregate and its value types.
//! - [`discovery`]: browse strategies, search filters, keyword extraction.
//! - Services: [`ListingService`], [`ViewService`], [`DiscoveryService`],
//!   [`UserListingsService`], [`BookmarkService`], [`ModerationService`],
//!   [`NotificationService`].

mod access;
pub mod audit;
pub mod bookmark;
mod bookmark_service;
pub mod discovery;
mod discovery_service;
pub mod error;
mod error_mapping;
pub mod listing;
pub mod listing_index;
mod listing_service;
mod moderation_service;
pub mod notification;
mod notification_service;
pub mod ports;
pub mod report;
pub mod trace_id;
pub mod user;
mod user_listings_service;
pub mod view;
mod view_service;

pub use self::audit::{AuditAction, AuditEntry};
pub use self::bookmark::{BookmarkEntry, BookmarkInsert, BookmarkedListing};
pub use self::bookmark_service::BookmarkService;
pub use self::discovery_service::DiscoveryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::listing::{
    ApartmentType, Availability, Listing, ListingDetails, ListingId, ListingPatch,
    ListingValidationError, MAX_LISTING_IMAGES, PaymentFrequency,
};
pub use self::listing_index::{IndexEntry, IndexScope, ListingDashboard};
pub use self::listing_service::ListingService;
pub use self::moderation_service::{ModerationPorts, ModerationService};
pub use self::notification::{
    NOTIFICATION_TTL_DAYS, Notification, NotificationId, NotificationMessage, NotificationMeta,
};
pub use self::notification_service::NotificationService;
pub use self::report::{
    MAX_REPORT_REASON_CHARS, Report, ReportId, ReportReason, ReportStatus, ReportValidationError,
};
pub use self::trace_id::TraceId;
pub use self::user::{Caller, UserId, UserRole, UserValidationError};
pub use self::user_listings_service::UserListingsService;
pub use self::view::{
    UNKNOWN_VIEWER_ADDRESS, VIEW_DEDUP_WINDOW_HOURS, ViewOutcome, ViewRecord, Viewer,
    dedup_window,
};
pub use self::view_service::ViewService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use rentals::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
