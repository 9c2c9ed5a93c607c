//! Reports, moderation, and administrative maintenance.
//!
//! Filing a report bumps the listing's report counter; resolving it takes
//! the count back down exactly once because only open reports can be
//! resolved. Owners and reporters hear about outcomes through the
//! fire-and-forget [`NotificationSink`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::access::{require_admin, require_superadmin, require_tenant};
use crate::domain::ports::{
    AdminContext, AuditLogRepository, ListingIndexRepository, ListingRepository,
    ModerationCommand, NotificationSink, ReportInsert, ReportRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, Caller, Error, IndexEntry, Listing, ListingId, NotificationMessage,
    NotificationMeta, Report, ReportId, ReportReason, ReportStatus, UserId, UserRole,
};

/// Driven ports the moderation service coordinates.
pub struct ModerationPorts<L: ?Sized, I: ?Sized, R: ?Sized, A: ?Sized> {
    /// Listing store.
    pub listings: Arc<L>,
    /// Per-user listing index.
    pub index: Arc<I>,
    /// Report ledger.
    pub reports: Arc<R>,
    /// Audit trail.
    pub audit: Arc<A>,
}

/// Service implementing [`ModerationCommand`].
pub struct ModerationService<L: ?Sized, I: ?Sized, R: ?Sized, A: ?Sized> {
    listings: Arc<L>,
    index: Arc<I>,
    reports: Arc<R>,
    audit: Arc<A>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized, I: ?Sized, R: ?Sized, A: ?Sized> ModerationService<L, I, R, A> {
    /// Create the service.
    pub fn new(
        ports: ModerationPorts<L, I, R, A>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ModerationPorts {
            listings,
            index,
            reports,
            audit,
        } = ports;
        Self {
            listings,
            index,
            reports,
            audit,
            notifier,
            clock,
        }
    }
}

impl<L, I, R, A> ModerationService<L, I, R, A>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
    R: ReportRepository + ?Sized,
    A: AuditLogRepository + ?Sized,
{
    async fn existing_report(&self, id: &ReportId) -> Result<Report, Error> {
        self.reports
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("report {id} not found")))
    }

    /// Append an audit entry. The action has already happened, so a failed
    /// append is logged rather than reported to the caller.
    async fn append_audit(&self, admin: &AdminContext, action: AuditAction, target: String) {
        let entry = AuditEntry::new(
            admin.caller.user_id.clone(),
            action,
            target,
            admin.ip_address.clone(),
            self.clock.utc(),
        );
        if let Err(err) = self.audit.record(&entry).await {
            error!(
                admin_id = %entry.admin_id,
                action = %entry.action,
                target = %entry.target,
                error = %err,
                "failed to append audit entry"
            );
        }
    }

    fn notify_owner(&self, listing: &Listing, message: String) {
        self.notifier.notify(NotificationMessage {
            user_id: listing.owner_id.clone(),
            role: listing.owner_role,
            message,
            meta: NotificationMeta::for_listing(listing),
        });
    }

    fn conflict_for_status(status: ReportStatus) -> Error {
        Error::conflict(format!("report is already {status}"))
            .with_details(json!({ "code": "invalid_transition", "status": status.as_str() }))
    }
}

#[async_trait]
impl<L, I, R, A> ModerationCommand for ModerationService<L, I, R, A>
where
    L: ListingRepository + ?Sized,
    I: ListingIndexRepository + ?Sized,
    R: ReportRepository + ?Sized,
    A: AuditLogRepository + ?Sized,
{
    async fn report(
        &self,
        caller: &Caller,
        listing_id: &ListingId,
        reason: String,
    ) -> Result<Report, Error> {
        require_tenant(caller, "report listings")?;
        let reason = ReportReason::new(reason)?;
        let listing = self
            .listings
            .find(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))?;

        let report = Report::file(*listing_id, caller.user_id.clone(), reason, self.clock.utc());
        if self.reports.insert(&report).await? == ReportInsert::AlreadyReported {
            return Err(Error::conflict("listing already reported")
                .with_details(json!({ "code": "already_reported" })));
        }

        self.listings.adjust_report_count(listing_id, 1).await?;
        info!(report_id = %report.id, %listing_id, "listing reported");
        self.notify_owner(
            &listing,
            format!("Your listing \"{}\" has been reported", listing.details.title),
        );
        Ok(report)
    }

    async fn list_reports(
        &self,
        caller: &Caller,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Report>, Error> {
        require_admin(caller)?;
        let (items, total) = self.reports.list(status, page).await?;
        Ok(Paginated::new(items, total, page))
    }

    async fn review(&self, caller: &Caller, id: &ReportId) -> Result<Report, Error> {
        require_admin(caller)?;
        let current = self.existing_report(id).await?;
        if current.status != ReportStatus::Pending {
            return Err(Self::conflict_for_status(current.status));
        }
        match self.reports.mark_reviewed(id).await? {
            Some(report) => Ok(report),
            None => {
                let latest = self.existing_report(id).await?;
                Err(Self::conflict_for_status(latest.status))
            }
        }
    }

    async fn resolve(&self, admin: &AdminContext, id: &ReportId) -> Result<Report, Error> {
        require_admin(&admin.caller)?;
        let current = self.existing_report(id).await?;
        if !current.status.is_open() {
            return Err(Self::conflict_for_status(current.status));
        }
        let Some(report) = self.reports.mark_resolved(id, self.clock.utc()).await? else {
            return Err(Self::conflict_for_status(ReportStatus::Resolved));
        };

        let listing = self.listings.find(&report.listing_id).await?;
        if self
            .listings
            .adjust_report_count(&report.listing_id, -1)
            .await?
            .is_none()
        {
            debug!(listing_id = %report.listing_id, "resolved report for a removed listing");
        }
        self.append_audit(admin, AuditAction::ResolveReport, report.id.to_string())
            .await;

        let meta = listing
            .as_ref()
            .map(NotificationMeta::for_listing)
            .unwrap_or_else(|| NotificationMeta {
                listing_id: Some(report.listing_id),
                ..NotificationMeta::default()
            });
        let title = meta.title.clone().unwrap_or_else(|| "a listing".to_owned());
        self.notifier.notify(NotificationMessage {
            user_id: report.reporter_id.clone(),
            role: UserRole::Tenant,
            message: format!("Your report on \"{title}\" has been resolved"),
            meta,
        });
        info!(report_id = %report.id, "report resolved");
        Ok(report)
    }

    async fn delete_listing(&self, admin: &AdminContext, id: &ListingId) -> Result<(), Error> {
        require_admin(&admin.caller)?;
        let listing = self
            .listings
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))?;
        if !self.listings.delete(id).await? {
            return Err(Error::not_found(format!("listing {id} not found")));
        }

        self.append_audit(admin, AuditAction::DeleteListing, id.to_string()).await;
        self.notify_owner(
            &listing,
            format!(
                "Your listing \"{}\" was removed by an administrator",
                listing.details.title
            ),
        );
        info!(listing_id = %id, admin_id = %admin.caller.user_id, "listing deleted");
        Ok(())
    }

    async fn audit_log(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Paginated<AuditEntry>, Error> {
        require_superadmin(caller)?;
        let (items, total) = self.audit.list(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    async fn reconcile_index(&self, admin: &AdminContext, user_id: &UserId) -> Result<u64, Error> {
        require_admin(&admin.caller)?;
        let indexed: HashSet<ListingId> = self
            .index
            .entries(user_id)
            .await?
            .into_iter()
            .map(|entry| entry.listing_id)
            .collect();

        let mut appended = 0_u64;
        for listing in self.listings.list_by_owner(user_id).await? {
            if indexed.contains(&listing.id) {
                continue;
            }
            if self.index.append(&IndexEntry::for_listing(&listing)).await? {
                appended += 1;
            }
        }

        self.append_audit(admin, AuditAction::ReconcileIndex, user_id.to_string())
            .await;
        info!(%user_id, appended, "listing index reconciled");
        Ok(appended)
    }
}

#[cfg(test)]
#[path = "moderation_service_tests.rs"]
mod tests;
