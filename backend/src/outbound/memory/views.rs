//! View log kept as a flat vector of observations.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ViewLogRepository, ViewLogRepositoryError};
use crate::domain::{ListingId, ViewRecord, Viewer};

use super::{read, write};

const STORE: &str = "view log";

/// In-memory [`ViewLogRepository`]. Records are never pruned.
#[derive(Debug, Default)]
pub struct MemoryViewLog {
    records: RwLock<Vec<ViewRecord>>,
}

fn same_viewer(stored: &Viewer, candidate: &Viewer) -> bool {
    let same_user = match (&stored.user_id, &candidate.user_id) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    same_user || stored.address == candidate.address
}

#[async_trait]
impl ViewLogRepository for MemoryViewLog {
    async fn has_recent(
        &self,
        listing_id: &ListingId,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, ViewLogRepositoryError> {
        let records = read(&self.records, STORE).map_err(ViewLogRepositoryError::query)?;
        Ok(records.iter().any(|record| {
            &record.listing_id == listing_id
                && record.viewed_at >= since
                && same_viewer(&record.viewer, viewer)
        }))
    }

    async fn insert(&self, record: &ViewRecord) -> Result<(), ViewLogRepositoryError> {
        let mut records = write(&self.records, STORE).map_err(ViewLogRepositoryError::query)?;
        records.push(record.clone());
        Ok(())
    }
}
