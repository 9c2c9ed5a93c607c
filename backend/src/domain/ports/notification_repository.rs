//! Port for the notification inbox.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification inbox adapters.
    pub enum NotificationRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "notification inbox connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification inbox query failed: {message}",
    }
}

/// Inbox storage. Every read takes `now` and skips expired items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a new item.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Live items for `user_id`, newest first, plus the total.
    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Notification>, u64), NotificationRepositoryError>;

    /// Mark one item read. Returns `false` if the user has no such item.
    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread item read, returning how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Delete one item. Returns `false` if the user has no such item.
    async fn delete(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;
}
