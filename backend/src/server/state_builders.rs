//! Builders for the storage backend and the handler state over it.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use rentals::domain::ports::NotificationSink;
use rentals::inbound::http::state::{HttpState, StoragePorts};
use rentals::outbound::memory::{
    MemoryAuditLog, MemoryBookmarkStore, MemoryListingIndex, MemoryListingStore,
    MemoryNotificationInbox, MemoryReportLedger, MemoryViewLog,
};
use rentals::outbound::notifications::{InboxNotifier, PresenceRegistry};
use rentals::outbound::persistence::{
    DbPool, DieselAuditLogRepository, DieselBookmarkRepository, DieselListingIndexRepository,
    DieselListingRepository, DieselNotificationRepository, DieselReportRepository,
    DieselViewLogRepository,
};

/// Diesel repositories over a shared pool.
pub(crate) fn diesel_storage(pool: &DbPool) -> StoragePorts {
    StoragePorts {
        listings: Arc::new(DieselListingRepository::new(pool.clone())),
        index: Arc::new(DieselListingIndexRepository::new(pool.clone())),
        views: Arc::new(DieselViewLogRepository::new(pool.clone())),
        bookmarks: Arc::new(DieselBookmarkRepository::new(pool.clone())),
        reports: Arc::new(DieselReportRepository::new(pool.clone())),
        audit: Arc::new(DieselAuditLogRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
    }
}

/// Process-local stores; state is lost on restart.
pub(crate) fn memory_storage() -> StoragePorts {
    StoragePorts {
        listings: Arc::new(MemoryListingStore::default()),
        index: Arc::new(MemoryListingIndex::default()),
        views: Arc::new(MemoryViewLog::default()),
        bookmarks: Arc::new(MemoryBookmarkStore::default()),
        reports: Arc::new(MemoryReportLedger::default()),
        audit: Arc::new(MemoryAuditLog::default()),
        notifications: Arc::new(MemoryNotificationInbox::default()),
    }
}

/// Pick the storage backend: PostgreSQL when a pool is configured,
/// otherwise memory.
pub(crate) fn build_storage(pool: Option<&DbPool>) -> StoragePorts {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL storage");
            diesel_storage(pool)
        }
        None => {
            info!("no database configured; using in-memory storage");
            memory_storage()
        }
    }
}

/// Handler state whose notifications are stored in the same backend and
/// pushed through `presence`.
pub(crate) fn build_http_state(
    pool: Option<&DbPool>,
    presence: Arc<PresenceRegistry>,
) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let storage = build_storage(pool);
    let notifier: Arc<dyn NotificationSink> = Arc::new(InboxNotifier::new(
        Arc::clone(&storage.notifications),
        presence,
        Arc::clone(&clock),
    ));
    HttpState::from_storage(storage, notifier, clock)
}
