//! In-process adapters for every driven port.
//!
//! These back the service unit tests and the `memory` storage backend used
//! for local runs without PostgreSQL. Each store keeps its state behind a
//! [`std::sync::RwLock`]; a poisoned lock surfaces as the port's `Query`
//! error rather than a panic.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

mod audit;
mod bookmarks;
mod listing_index;
mod listings;
mod notifications;
mod reports;
mod views;

pub use audit::MemoryAuditLog;
pub use bookmarks::MemoryBookmarkStore;
pub use listing_index::MemoryListingIndex;
pub use listings::MemoryListingStore;
pub use notifications::MemoryNotificationInbox;
pub use reports::MemoryReportLedger;
pub use views::MemoryViewLog;

fn read<'a, T>(lock: &'a RwLock<T>, store: &str) -> Result<RwLockReadGuard<'a, T>, String> {
    lock.read().map_err(|_| format!("{store} lock poisoned"))
}

fn write<'a, T>(lock: &'a RwLock<T>, store: &str) -> Result<RwLockWriteGuard<'a, T>, String> {
    lock.write().map_err(|_| format!("{store} lock poisoned"))
}

/// Page window over already ordered `items` plus the unpaged total.
fn page_of<T>(items: Vec<T>, page: pagination::PageRequest) -> (Vec<T>, u64) {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    (page.window(items), total)
}
