//! Port for the report ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{Report, ReportId, ReportStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report ledger adapters.
    pub enum ReportRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "report ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "report ledger query failed: {message}",
    }
}

/// Outcome of filing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportInsert {
    /// Stored.
    Inserted,
    /// The reporter had already reported this listing.
    AlreadyReported,
}

/// Port for reports and their status transitions.
///
/// Transitions are conditional updates: they only apply when the stored
/// status allows them and return `None` otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store `report` unless `(listing, reporter)` already exists.
    async fn insert(&self, report: &Report) -> Result<ReportInsert, ReportRepositoryError>;

    /// Fetch one report.
    async fn find(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError>;

    /// `pending → reviewed`.
    async fn mark_reviewed(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError>;

    /// `pending | reviewed → resolved`, stamping `resolved_at`.
    async fn mark_resolved(
        &self,
        id: &ReportId,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Report>, ReportRepositoryError>;

    /// Reports newest first, optionally filtered by status, plus the total.
    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Report>, u64), ReportRepositoryError>;
}
