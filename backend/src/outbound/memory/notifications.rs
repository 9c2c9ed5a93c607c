//! Notification inbox kept as a flat vector.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::{page_of, read, write};

const STORE: &str = "notification inbox";

/// In-memory [`NotificationRepository`]. Expired items stay stored but are
/// never returned.
#[derive(Debug, Default)]
pub struct MemoryNotificationInbox {
    items: RwLock<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepository for MemoryNotificationInbox {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut items = write(&self.items, STORE).map_err(NotificationRepositoryError::query)?;
        items.push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Notification>, u64), NotificationRepositoryError> {
        let items = read(&self.items, STORE).map_err(NotificationRepositoryError::query)?;
        let mut live: Vec<Notification> = items
            .iter()
            .filter(|n| &n.user_id == user_id && !n.is_expired(now))
            .filter(|n| !unread_only || !n.read)
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(live, page))
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut items = write(&self.items, STORE).map_err(NotificationRepositoryError::query)?;
        let Some(item) = items
            .iter_mut()
            .find(|n| &n.id == id && &n.user_id == user_id)
        else {
            return Ok(false);
        };
        item.read = true;
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut items = write(&self.items, STORE).map_err(NotificationRepositoryError::query)?;
        let mut changed = 0_u64;
        for item in items.iter_mut().filter(|n| &n.user_id == user_id && !n.read) {
            item.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut items = write(&self.items, STORE).map_err(NotificationRepositoryError::query)?;
        let before = items.len();
        items.retain(|n| !(&n.id == id && &n.user_id == user_id));
        Ok(items.len() != before)
    }
}
