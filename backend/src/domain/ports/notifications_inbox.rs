//! Driving port for the caller's notification inbox.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{Caller, Error, Notification, NotificationId};

/// Read and manage the caller's own notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsInbox: Send + Sync {
    /// Live notifications, newest first.
    async fn list(
        &self,
        caller: &Caller,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, Error>;

    /// Mark one notification read; `not_found` when not the caller's.
    async fn mark_read(&self, caller: &Caller, id: &NotificationId) -> Result<(), Error>;

    /// Mark everything read, returning how many changed.
    async fn mark_all_read(&self, caller: &Caller) -> Result<u64, Error>;

    /// Delete one notification; `not_found` when not the caller's.
    async fn delete(&self, caller: &Caller, id: &NotificationId) -> Result<(), Error>;
}
