//! PostgreSQL-backed `ViewLogRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ViewLogRepository, ViewLogRepositoryError};
use crate::domain::{ListingId, ViewRecord, Viewer};

use super::diesel_basic_error_mapping::port_error_mappers;
use super::models::NewViewRow;
use super::pool::DbPool;
use super::schema::listing_views;

/// Diesel-backed view log.
#[derive(Clone)]
pub struct DieselViewLogRepository {
    pool: DbPool,
}

impl DieselViewLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(ViewLogRepositoryError);

#[async_trait]
impl ViewLogRepository for DieselViewLogRepository {
    async fn has_recent(
        &self,
        listing_id: &ListingId,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, ViewLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recent = listing_views::table
            .filter(listing_views::listing_id.eq(listing_id.as_uuid()))
            .filter(listing_views::created_at.ge(since))
            .into_boxed();
        let recent = match viewer.user_id.as_ref() {
            Some(user_id) => recent.filter(
                listing_views::viewer_id
                    .eq(*user_id.as_uuid())
                    .or(listing_views::viewer_address.eq(viewer.address.clone()))
                    .assume_not_null(),
            ),
            None => recent.filter(listing_views::viewer_address.eq(viewer.address.clone())),
        };
        diesel::select(exists(recent))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert(&self, record: &ViewRecord) -> Result<(), ViewLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(listing_views::table)
            .values(NewViewRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
