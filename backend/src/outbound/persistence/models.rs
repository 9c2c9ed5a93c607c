//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer. Decoding is fallible because the
//! database stores enums as text and counters as signed integers; a row that
//! fails to decode surfaces as the repository's `Query` error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AuditAction, AuditEntry, BookmarkEntry, IndexEntry, Listing, ListingDetails, ListingId,
    Notification, NotificationId, NotificationMeta, Report, ReportId, ReportReason, ReportStatus,
    UserId, ViewRecord,
};

use super::schema::{
    admin_audit_log, bookmarks, listing_reports, listing_views, listings, notifications,
    user_listing_index,
};

/// Row decoding or encoding failure.
pub(crate) type RowError = String;

pub(crate) fn to_db_i64(value: u64, field: &str) -> Result<i64, RowError> {
    i64::try_from(value).map_err(|_| format!("{field} exceeds the storable range"))
}

pub(crate) fn to_db_i32(value: u32, field: &str) -> Result<i32, RowError> {
    i32::try_from(value).map_err(|_| format!("{field} exceeds the storable range"))
}

fn from_db_u64(value: i64, field: &str) -> Result<u64, RowError> {
    u64::try_from(value).map_err(|_| format!("negative {field} in storage"))
}

fn from_db_u32(value: i32, field: &str) -> Result<u32, RowError> {
    u32::try_from(value).map_err(|_| format!("negative {field} in storage"))
}

fn parse_field<T>(raw: &str, field: &str) -> Result<T, RowError>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| format!("unrecognised {field} in storage: {raw}"))
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_role: String,
    pub title: String,
    pub description: Option<String>,
    pub apartment_type: String,
    pub price: i64,
    pub payment_frequency: String,
    pub duration: String,
    pub location: String,
    pub address: String,
    pub nearest_landmark: Option<String>,
    pub images: Vec<String>,
    pub contact_phone: String,
    pub amenities: Vec<String>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub size: Option<String>,
    pub furnished: bool,
    pub service_charge: i64,
    pub is_available: bool,
    pub views: i64,
    pub verified: bool,
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RowError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let details = ListingDetails {
            title: row.title,
            description: row.description,
            apartment_type: parse_field(&row.apartment_type, "apartment type")?,
            price: from_db_u64(row.price, "price")?,
            payment_frequency: parse_field(&row.payment_frequency, "payment frequency")?,
            duration: row.duration,
            location: row.location,
            address: row.address,
            nearest_landmark: row.nearest_landmark,
            images: row.images,
            contact_phone: row.contact_phone,
            amenities: row.amenities,
            bedrooms: from_db_u32(row.bedrooms, "bedrooms")?,
            bathrooms: from_db_u32(row.bathrooms, "bathrooms")?,
            size: row.size,
            furnished: row.furnished,
            service_charge: from_db_u64(row.service_charge, "service charge")?,
        };
        Ok(Self {
            id: ListingId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            owner_role: parse_field(&row.owner_role, "owner role")?,
            details,
            is_available: row.is_available,
            views: from_db_u64(row.views, "views")?,
            verified: row.verified,
            report_count: from_db_u32(row.report_count, "report count")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Owner-editable columns, shared by inserts and detail updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingDetailsColumns<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub apartment_type: &'a str,
    pub price: i64,
    pub payment_frequency: &'a str,
    pub duration: &'a str,
    pub location: &'a str,
    pub address: &'a str,
    pub nearest_landmark: Option<&'a str>,
    pub images: &'a [String],
    pub contact_phone: &'a str,
    pub amenities: &'a [String],
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub size: Option<&'a str>,
    pub furnished: bool,
    pub service_charge: i64,
}

impl<'a> ListingDetailsColumns<'a> {
    pub(crate) fn encode(details: &'a ListingDetails) -> Result<Self, RowError> {
        Ok(Self {
            title: &details.title,
            description: details.description.as_deref(),
            apartment_type: details.apartment_type.as_str(),
            price: to_db_i64(details.price, "price")?,
            payment_frequency: details.payment_frequency.as_str(),
            duration: &details.duration,
            location: &details.location,
            address: &details.address,
            nearest_landmark: details.nearest_landmark.as_deref(),
            images: &details.images,
            contact_phone: &details.contact_phone,
            amenities: &details.amenities,
            bedrooms: to_db_i32(details.bedrooms, "bedrooms")?,
            bathrooms: to_db_i32(details.bathrooms, "bathrooms")?,
            size: details.size.as_deref(),
            furnished: details.furnished,
            service_charge: to_db_i64(details.service_charge, "service charge")?,
        })
    }
}

/// System-managed columns written once at publish time.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingSystemColumns<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_role: &'a str,
    pub is_available: bool,
    pub views: i64,
    pub verified: bool,
    pub report_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewListingSystemColumns<'a> {
    pub(crate) fn encode(listing: &'a Listing) -> Result<Self, RowError> {
        Ok(Self {
            id: *listing.id.as_uuid(),
            owner_id: *listing.owner_id.as_uuid(),
            owner_role: listing.owner_role.as_str(),
            is_available: listing.is_available,
            views: to_db_i64(listing.views, "views")?,
            verified: listing.verified,
            report_count: to_db_i32(listing.report_count, "report count")?,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Per-user index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_listing_index)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IndexEntryRow {
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub posted_at: DateTime<Utc>,
}

impl From<&IndexEntry> for IndexEntryRow {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            user_id: *entry.user_id.as_uuid(),
            listing_id: *entry.listing_id.as_uuid(),
            posted_at: entry.posted_at,
        }
    }
}

impl From<IndexEntryRow> for IndexEntry {
    fn from(row: IndexEntryRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            listing_id: ListingId::from_uuid(row.listing_id),
            posted_at: row.posted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listing_views)]
pub(crate) struct NewViewRow<'a> {
    pub listing_id: Uuid,
    pub viewer_id: Option<Uuid>,
    pub viewer_address: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a ViewRecord> for NewViewRow<'a> {
    fn from(record: &'a ViewRecord) -> Self {
        Self {
            listing_id: *record.listing_id.as_uuid(),
            viewer_id: record.viewer.user_id.as_ref().map(|id| *id.as_uuid()),
            viewer_address: &record.viewer.address,
            created_at: record.viewed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookmarks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookmarkRow {
    pub listing_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

impl From<BookmarkRow> for BookmarkEntry {
    fn from(row: BookmarkRow) -> Self {
        Self {
            listing_id: ListingId::from_uuid(row.listing_id),
            saved_at: row.saved_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookmarks)]
pub(crate) struct NewBookmarkRow {
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = listing_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        Self {
            id: *report.id.as_uuid(),
            listing_id: *report.listing_id.as_uuid(),
            reporter_id: *report.reporter_id.as_uuid(),
            reason: report.reason.as_str().to_owned(),
            status: report.status.as_str().to_owned(),
            created_at: report.created_at,
            resolved_at: report.resolved_at,
        }
    }
}

impl TryFrom<ReportRow> for Report {
    type Error = RowError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReportId::from_uuid(row.id),
            listing_id: ListingId::from_uuid(row.listing_id),
            reporter_id: UserId::from_uuid(row.reporter_id),
            reason: ReportReason::new(&row.reason).map_err(|err| err.to_string())?,
            status: parse_field::<ReportStatus>(&row.status, "report status")?,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admin_audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditEntry> for AuditRow {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            id: entry.id,
            admin_id: *entry.admin_id.as_uuid(),
            action: entry.action.as_str().to_owned(),
            target: entry.target.clone(),
            ip_address: entry.ip_address.clone(),
            created_at: entry.created_at,
        }
    }
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = RowError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&row.action)
            .ok_or_else(|| format!("unrecognised audit action in storage: {}", row.action))?;
        Ok(Self {
            id: row.id,
            admin_id: UserId::from_uuid(row.admin_id),
            action,
            target: row.target,
            ip_address: row.ip_address,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub message: String,
    pub meta: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<&Notification> for NotificationRow {
    type Error = RowError;

    fn try_from(notification: &Notification) -> Result<Self, Self::Error> {
        let meta = serde_json::to_value(&notification.meta)
            .map_err(|err| format!("serialise notification meta: {err}"))?;
        Ok(Self {
            id: *notification.id.as_uuid(),
            user_id: *notification.user_id.as_uuid(),
            role: notification.role.as_str().to_owned(),
            message: notification.message.clone(),
            meta,
            read: notification.read,
            created_at: notification.created_at,
            expires_at: notification.expires_at,
        })
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RowError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let meta: NotificationMeta = serde_json::from_value(row.meta)
            .map_err(|err| format!("decode notification meta: {err}"))?;
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            role: parse_field(&row.role, "role")?,
            message: row.message,
            meta,
            read: row.read,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}
