//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AuditLogRepository, BookmarkRepository, BookmarksCommand, ListingIndexRepository,
    ListingRepository, ListingsCommand, ListingsQuery, ModerationCommand, NotificationRepository,
    NotificationSink, NotificationsInbox, ReportRepository, UserListingsQuery, ViewLogRepository,
    ViewsCommand,
};
use crate::domain::{
    BookmarkService, DiscoveryService, ListingService, ModerationPorts, ModerationService,
    NotificationService, UserListingsService, ViewService,
};

/// Dependency bundle for HTTP handlers: one driving port per concern.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<dyn ListingsCommand>,
    pub listings_query: Arc<dyn ListingsQuery>,
    pub views: Arc<dyn ViewsCommand>,
    pub user_listings: Arc<dyn UserListingsQuery>,
    pub bookmarks: Arc<dyn BookmarksCommand>,
    pub moderation: Arc<dyn ModerationCommand>,
    pub notifications: Arc<dyn NotificationsInbox>,
}

/// Driven ports a storage backend supplies.
#[derive(Clone)]
pub struct StoragePorts {
    pub listings: Arc<dyn ListingRepository>,
    pub index: Arc<dyn ListingIndexRepository>,
    pub views: Arc<dyn ViewLogRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub audit: Arc<dyn AuditLogRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl HttpState {
    /// Wire the domain services over `storage`.
    pub fn from_storage(
        storage: StoragePorts,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let StoragePorts {
            listings,
            index,
            views,
            bookmarks,
            reports,
            audit,
            notifications,
        } = storage;
        Self {
            listings: Arc::new(ListingService::new(
                Arc::clone(&listings),
                Arc::clone(&index),
                Arc::clone(&clock),
            )),
            listings_query: Arc::new(DiscoveryService::new(Arc::clone(&listings))),
            views: Arc::new(ViewService::new(
                Arc::clone(&listings),
                views,
                Arc::clone(&clock),
            )),
            user_listings: Arc::new(UserListingsService::new(
                Arc::clone(&listings),
                Arc::clone(&index),
            )),
            bookmarks: Arc::new(BookmarkService::new(
                Arc::clone(&listings),
                bookmarks,
                Arc::clone(&clock),
            )),
            moderation: Arc::new(ModerationService::new(
                ModerationPorts {
                    listings,
                    index,
                    reports,
                    audit,
                },
                notifier,
                Arc::clone(&clock),
            )),
            notifications: Arc::new(NotificationService::new(notifications, clock)),
        }
    }
}
