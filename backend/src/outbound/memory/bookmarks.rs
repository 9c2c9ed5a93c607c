//! Bookmark lists kept most-recent-first per tenant.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{BookmarkRepository, BookmarkRepositoryError};
use crate::domain::{BookmarkEntry, BookmarkInsert, ListingId, UserId};

use super::{read, write};

const STORE: &str = "bookmark store";

/// In-memory [`BookmarkRepository`].
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    lists: RwLock<HashMap<UserId, Vec<BookmarkEntry>>>,
}

#[async_trait]
impl BookmarkRepository for MemoryBookmarkStore {
    async fn insert_front(
        &self,
        tenant_id: &UserId,
        entry: &BookmarkEntry,
    ) -> Result<BookmarkInsert, BookmarkRepositoryError> {
        let mut lists = write(&self.lists, STORE).map_err(BookmarkRepositoryError::query)?;
        let list = lists.entry(tenant_id.clone()).or_default();
        if list.iter().any(|e| e.listing_id == entry.listing_id) {
            return Ok(BookmarkInsert::AlreadyExists);
        }
        list.insert(0, entry.clone());
        Ok(BookmarkInsert::Inserted)
    }

    async fn remove(
        &self,
        tenant_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<bool, BookmarkRepositoryError> {
        let mut lists = write(&self.lists, STORE).map_err(BookmarkRepositoryError::query)?;
        let Some(list) = lists.get_mut(tenant_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|e| &e.listing_id != listing_id);
        Ok(list.len() != before)
    }

    async fn clear(&self, tenant_id: &UserId) -> Result<u64, BookmarkRepositoryError> {
        let mut lists = write(&self.lists, STORE).map_err(BookmarkRepositoryError::query)?;
        let removed = lists.remove(tenant_id).map_or(0, |list| list.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn list(&self, tenant_id: &UserId) -> Result<Vec<BookmarkEntry>, BookmarkRepositoryError> {
        let lists = read(&self.lists, STORE).map_err(BookmarkRepositoryError::query)?;
        Ok(lists.get(tenant_id).cloned().unwrap_or_default())
    }
}
