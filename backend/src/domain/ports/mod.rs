//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`*Repository`, [`NotificationSink`]) describe what the
//! domain needs from storage and delivery adapters; each exposes a typed
//! error built with `define_port_error!`. Driving ports (`*Command`,
//! `*Query`, [`NotificationsInbox`]) are what inbound adapters call and
//! return the domain [`Error`](crate::domain::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log_repository;
mod bookmark_repository;
mod bookmarks_command;
mod listing_index_repository;
mod listing_repository;
mod listings_command;
mod listings_query;
mod moderation_command;
mod notification_repository;
mod notification_sink;
mod notifications_inbox;
mod report_repository;
mod user_listings_query;
mod view_log_repository;
mod views_command;

#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{AuditLogRepository, AuditLogRepositoryError};
#[cfg(test)]
pub use bookmark_repository::MockBookmarkRepository;
pub use bookmark_repository::{BookmarkRepository, BookmarkRepositoryError};
#[cfg(test)]
pub use bookmarks_command::MockBookmarksCommand;
pub use bookmarks_command::BookmarksCommand;
#[cfg(test)]
pub use listing_index_repository::MockListingIndexRepository;
pub use listing_index_repository::{ListingIndexRepository, ListingIndexRepositoryError};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{
    AvailabilityChange, ListingPage, ListingRepository, ListingRepositoryError,
};
#[cfg(test)]
pub use listings_command::MockListingsCommand;
pub use listings_command::ListingsCommand;
#[cfg(test)]
pub use listings_query::MockListingsQuery;
pub use listings_query::ListingsQuery;
#[cfg(test)]
pub use moderation_command::MockModerationCommand;
pub use moderation_command::{AdminContext, ModerationCommand};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{NoOpNotificationSink, NotificationSink};
#[cfg(test)]
pub use notifications_inbox::MockNotificationsInbox;
pub use notifications_inbox::NotificationsInbox;
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportInsert, ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use user_listings_query::MockUserListingsQuery;
pub use user_listings_query::UserListingsQuery;
#[cfg(test)]
pub use view_log_repository::MockViewLogRepository;
pub use view_log_repository::{ViewLogRepository, ViewLogRepositoryError};
#[cfg(test)]
pub use views_command::MockViewsCommand;
pub use views_command::ViewsCommand;
