//! PostgreSQL-backed `ListingIndexRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ListingIndexRepository, ListingIndexRepositoryError};
use crate::domain::{IndexEntry, UserId};

use super::diesel_basic_error_mapping::port_error_mappers;
use super::models::IndexEntryRow;
use super::pool::DbPool;
use super::schema::user_listing_index;

/// Diesel-backed per-user listing index.
#[derive(Clone)]
pub struct DieselListingIndexRepository {
    pool: DbPool,
}

impl DieselListingIndexRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(ListingIndexRepositoryError);

#[async_trait]
impl ListingIndexRepository for DieselListingIndexRepository {
    async fn append(&self, entry: &IndexEntry) -> Result<bool, ListingIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(user_listing_index::table)
            .values(IndexEntryRow::from(entry))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn entries(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<IndexEntry>, ListingIndexRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<IndexEntryRow> = user_listing_index::table
            .filter(user_listing_index::user_id.eq(user_id.as_uuid()))
            .select(IndexEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(IndexEntry::from).collect())
    }
}
