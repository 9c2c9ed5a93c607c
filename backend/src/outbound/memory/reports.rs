//! Report ledger kept as a vector in filing order.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{ReportInsert, ReportRepository, ReportRepositoryError};
use crate::domain::{Report, ReportId, ReportStatus};

use super::{page_of, read, write};

const STORE: &str = "report ledger";

/// In-memory [`ReportRepository`].
#[derive(Debug, Default)]
pub struct MemoryReportLedger {
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportLedger {
    fn transition(
        &self,
        id: &ReportId,
        f: impl FnOnce(&mut Report) -> bool,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let mut reports = write(&self.reports, STORE).map_err(ReportRepositoryError::query)?;
        let Some(report) = reports.iter_mut().find(|r| &r.id == id) else {
            return Ok(None);
        };
        Ok(f(report).then(|| report.clone()))
    }
}

#[async_trait]
impl ReportRepository for MemoryReportLedger {
    async fn insert(&self, report: &Report) -> Result<ReportInsert, ReportRepositoryError> {
        let mut reports = write(&self.reports, STORE).map_err(ReportRepositoryError::query)?;
        let duplicate = reports.iter().any(|r| {
            r.listing_id == report.listing_id && r.reporter_id == report.reporter_id
        });
        if duplicate {
            return Ok(ReportInsert::AlreadyReported);
        }
        reports.push(report.clone());
        Ok(ReportInsert::Inserted)
    }

    async fn find(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let reports = read(&self.reports, STORE).map_err(ReportRepositoryError::query)?;
        Ok(reports.iter().find(|r| &r.id == id).cloned())
    }

    async fn mark_reviewed(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        self.transition(id, |report| {
            if report.status != ReportStatus::Pending {
                return false;
            }
            report.status = ReportStatus::Reviewed;
            true
        })
    }

    async fn mark_resolved(
        &self,
        id: &ReportId,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        self.transition(id, |report| {
            if !report.status.is_open() {
                return false;
            }
            report.status = ReportStatus::Resolved;
            report.resolved_at = Some(resolved_at);
            true
        })
    }

    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Report>, u64), ReportRepositoryError> {
        let reports = read(&self.reports, STORE).map_err(ReportRepositoryError::query)?;
        let mut matching: Vec<Report> = reports
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(matching, page))
    }
}
