//! PostgreSQL-backed `ReportRepository`.
//!
//! Status transitions are `UPDATE ... WHERE status IN (...)`; zero rows
//! updated means the report is missing or not in an eligible state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{ReportInsert, ReportRepository, ReportRepositoryError};
use crate::domain::{Report, ReportId, ReportStatus};

use super::diesel_basic_error_mapping::{count_to_total, limit_offset, port_error_mappers};
use super::models::ReportRow;
use super::pool::DbPool;
use super::schema::listing_reports;

/// Diesel-backed report ledger.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(ReportRepositoryError);

fn decode(row: Option<ReportRow>) -> Result<Option<Report>, ReportRepositoryError> {
    row.map(Report::try_from)
        .transpose()
        .map_err(ReportRepositoryError::query)
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn insert(&self, report: &Report) -> Result<ReportInsert, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(listing_reports::table)
            .values(ReportRow::from(report))
            .on_conflict((listing_reports::listing_id, listing_reports::reporter_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if inserted == 0 {
            ReportInsert::AlreadyReported
        } else {
            ReportInsert::Inserted
        })
    }

    async fn find(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = listing_reports::table
            .find(id.as_uuid())
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn mark_reviewed(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            listing_reports::table
                .find(id.as_uuid())
                .filter(listing_reports::status.eq(ReportStatus::Pending.as_str())),
        )
        .set(listing_reports::status.eq(ReportStatus::Reviewed.as_str()))
        .returning(ReportRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn mark_resolved(
        &self,
        id: &ReportId,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let open = [ReportStatus::Pending.as_str(), ReportStatus::Reviewed.as_str()];
        let row = diesel::update(
            listing_reports::table
                .find(id.as_uuid())
                .filter(listing_reports::status.eq_any(open)),
        )
        .set((
            listing_reports::status.eq(ReportStatus::Resolved.as_str()),
            listing_reports::resolved_at.eq(Some(resolved_at)),
        ))
        .returning(ReportRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        decode(row)
    }

    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Report>, u64), ReportRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(ReportRepositoryError::query)?;
        let filtered = || {
            let mut query = listing_reports::table.into_boxed();
            if let Some(status) = status {
                query = query.filter(listing_reports::status.eq(status.as_str()));
            }
            query
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ReportRow> = filtered()
            .order((listing_reports::created_at.desc(), listing_reports::id.asc()))
            .select(ReportRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let reports = rows
            .into_iter()
            .map(Report::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ReportRepositoryError::query)?;
        Ok((reports, count_to_total(total)))
    }
}
