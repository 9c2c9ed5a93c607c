//! Append-only audit log.

use std::sync::RwLock;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::AuditEntry;
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::{page_of, read, write};

const STORE: &str = "audit log";

/// In-memory [`AuditLogRepository`].
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditLogRepository for MemoryAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        let mut entries = write(&self.entries, STORE).map_err(AuditLogRepositoryError::query)?;
        entries.push(entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AuditEntry>, u64), AuditLogRepositoryError> {
        let entries = read(&self.entries, STORE).map_err(AuditLogRepositoryError::query)?;
        let mut newest_first = entries.clone();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(newest_first, page))
    }
}
