//! Driving port for reports and administrative actions.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{
    AuditEntry, Caller, Error, ListingId, Report, ReportId, ReportStatus, UserId,
};

/// An administrator acting through a request, with the address recorded in
/// the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    /// Acting caller; must hold an admin role.
    pub caller: Caller,
    /// Request origin, when known.
    pub ip_address: Option<String>,
}

/// Report filing, moderation, and administrative maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationCommand: Send + Sync {
    /// File a report (tenant only). Duplicate reports are `conflict`.
    async fn report(
        &self,
        caller: &Caller,
        listing_id: &ListingId,
        reason: String,
    ) -> Result<Report, Error>;

    /// Reports newest first (admin).
    async fn list_reports(
        &self,
        caller: &Caller,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Report>, Error>;

    /// Mark a pending report reviewed (admin).
    async fn review(&self, caller: &Caller, id: &ReportId) -> Result<Report, Error>;

    /// Resolve an open report and decrement the listing's counter once.
    async fn resolve(&self, admin: &AdminContext, id: &ReportId) -> Result<Report, Error>;

    /// Hard delete a listing and audit it (admin).
    async fn delete_listing(&self, admin: &AdminContext, id: &ListingId) -> Result<(), Error>;

    /// Audit entries newest first (superadmin).
    async fn audit_log(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Paginated<AuditEntry>, Error>;

    /// Append index entries missing for listings owned by `user_id`,
    /// returning how many were added (admin).
    async fn reconcile_index(&self, admin: &AdminContext, user_id: &UserId) -> Result<u64, Error>;
}
