//! Per-user listing index kept as one vector per owner.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{ListingIndexRepository, ListingIndexRepositoryError};
use crate::domain::{IndexEntry, UserId};

use super::{read, write};

const STORE: &str = "listing index";

/// In-memory [`ListingIndexRepository`].
#[derive(Debug, Default)]
pub struct MemoryListingIndex {
    entries: RwLock<HashMap<UserId, Vec<IndexEntry>>>,
}

#[async_trait]
impl ListingIndexRepository for MemoryListingIndex {
    async fn append(&self, entry: &IndexEntry) -> Result<bool, ListingIndexRepositoryError> {
        let mut entries = write(&self.entries, STORE).map_err(ListingIndexRepositoryError::query)?;
        let user_entries = entries.entry(entry.user_id.clone()).or_default();
        if user_entries
            .iter()
            .any(|existing| existing.listing_id == entry.listing_id)
        {
            return Ok(false);
        }
        user_entries.push(entry.clone());
        Ok(true)
    }

    async fn entries(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<IndexEntry>, ListingIndexRepositoryError> {
        let entries = read(&self.entries, STORE).map_err(ListingIndexRepositoryError::query)?;
        Ok(entries.get(user_id).cloned().unwrap_or_default())
    }
}
