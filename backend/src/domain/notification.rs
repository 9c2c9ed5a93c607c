//! In-app notifications.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::{Listing, ListingId};
use super::user::{UserId, UserRole};

/// Days a notification stays in the inbox.
pub const NOTIFICATION_TTL_DAYS: i64 = 30;

/// Notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Listing context attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMeta {
    /// Listing the message concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
    /// Its title at the time of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Its location at the time of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl NotificationMeta {
    /// Snapshot the identifying fields of `listing`.
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            listing_id: Some(listing.id),
            title: Some(listing.details.title.clone()),
            location: Some(listing.details.location.clone()),
        }
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Recipient.
    pub user_id: UserId,
    /// Recipient's role at the time of sending.
    pub role: UserRole,
    /// Human-readable text.
    pub message: String,
    /// Listing context.
    pub meta: NotificationMeta,
}

/// A stored inbox item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Identity.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Recipient role.
    pub role: UserRole,
    /// Text.
    pub message: String,
    /// Listing context.
    pub meta: NotificationMeta,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// After this instant the item is no longer returned.
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    /// Materialise `message` as an unread inbox item.
    pub fn from_message(message: NotificationMessage, now: DateTime<Utc>) -> Self {
        let NotificationMessage {
            user_id,
            role,
            message,
            meta,
        } = message;
        Self {
            id: NotificationId::random(),
            user_id,
            role,
            message,
            meta,
            read: false,
            created_at: now,
            expires_at: now + Duration::days(NOTIFICATION_TTL_DAYS),
        }
    }

    /// Whether the item has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_expire_after_thirty_days() {
        let now = Utc::now();
        let item = Notification::from_message(
            NotificationMessage {
                user_id: UserId::random(),
                role: UserRole::Tenant,
                message: "hello".to_owned(),
                meta: NotificationMeta::default(),
            },
            now,
        );
        assert!(!item.read);
        assert!(!item.is_expired(now + Duration::days(29)));
        assert!(item.is_expired(now + Duration::days(30)));
    }

    #[test]
    fn empty_meta_serialises_to_empty_object() {
        let json = serde_json::to_value(NotificationMeta::default()).expect("serialise meta");
        assert_eq!(json, serde_json::json!({}));
    }
}
