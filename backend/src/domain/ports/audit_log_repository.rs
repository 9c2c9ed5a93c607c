//! Port for the administrative audit log.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::AuditEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit log adapters.
    pub enum AuditLogRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "audit log connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "audit log query failed: {message}",
    }
}

/// Append-only audit trail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append an entry.
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError>;

    /// Entries newest first, plus the total.
    async fn list(&self, page: PageRequest)
    -> Result<(Vec<AuditEntry>, u64), AuditLogRepositoryError>;
}
