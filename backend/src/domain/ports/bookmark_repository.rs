//! Port for tenant bookmarks.

use async_trait::async_trait;

use crate::domain::{BookmarkEntry, BookmarkInsert, ListingId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by bookmark store adapters.
    pub enum BookmarkRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "bookmark store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "bookmark store query failed: {message}",
    }
}

/// Port for per-tenant ordered bookmark lists.
///
/// Stored order is most-recent-first; adapters must enforce `(tenant,
/// listing)` uniqueness atomically and report a duplicate as
/// [`BookmarkInsert::AlreadyExists`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Insert `entry` at the front of the tenant's list.
    async fn insert_front(
        &self,
        tenant_id: &UserId,
        entry: &BookmarkEntry,
    ) -> Result<BookmarkInsert, BookmarkRepositoryError>;

    /// Remove the entry for `listing_id`. Returns whether one existed.
    async fn remove(
        &self,
        tenant_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<bool, BookmarkRepositoryError>;

    /// Remove every entry, returning how many were removed.
    async fn clear(&self, tenant_id: &UserId) -> Result<u64, BookmarkRepositoryError>;

    /// Every entry in stored order.
    async fn list(&self, tenant_id: &UserId) -> Result<Vec<BookmarkEntry>, BookmarkRepositoryError>;
}
