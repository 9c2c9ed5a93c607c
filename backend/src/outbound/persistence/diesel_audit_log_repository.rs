//! PostgreSQL-backed `AuditLogRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::AuditEntry;
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::diesel_basic_error_mapping::{count_to_total, limit_offset, port_error_mappers};
use super::models::AuditRow;
use super::pool::DbPool;
use super::schema::admin_audit_log;

/// Diesel-backed audit log.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(AuditLogRepositoryError);

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(admin_audit_log::table)
            .values(AuditRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AuditEntry>, u64), AuditLogRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(AuditLogRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = admin_audit_log::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<AuditRow> = admin_audit_log::table
            .order((admin_audit_log::created_at.desc(), admin_audit_log::id.asc()))
            .select(AuditRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let entries = rows
            .into_iter()
            .map(AuditEntry::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AuditLogRepositoryError::query)?;
        Ok((entries, count_to_total(total)))
    }
}
