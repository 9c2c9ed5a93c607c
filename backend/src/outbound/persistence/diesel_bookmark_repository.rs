//! PostgreSQL-backed `BookmarkRepository`.
//!
//! Stored order is the bigserial `id`, newest first. Uniqueness is the
//! `(tenant_id, listing_id)` constraint, so concurrent duplicate inserts
//! resolve to exactly one row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BookmarkRepository, BookmarkRepositoryError};
use crate::domain::{BookmarkEntry, BookmarkInsert, ListingId, UserId};

use super::diesel_basic_error_mapping::port_error_mappers;
use super::models::{BookmarkRow, NewBookmarkRow};
use super::pool::DbPool;
use super::schema::bookmarks;

/// Diesel-backed bookmark store.
#[derive(Clone)]
pub struct DieselBookmarkRepository {
    pool: DbPool,
}

impl DieselBookmarkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(BookmarkRepositoryError);

#[async_trait]
impl BookmarkRepository for DieselBookmarkRepository {
    async fn insert_front(
        &self,
        tenant_id: &UserId,
        entry: &BookmarkEntry,
    ) -> Result<BookmarkInsert, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBookmarkRow {
            tenant_id: *tenant_id.as_uuid(),
            listing_id: *entry.listing_id.as_uuid(),
            saved_at: entry.saved_at,
        };
        let inserted = diesel::insert_into(bookmarks::table)
            .values(&row)
            .on_conflict((bookmarks::tenant_id, bookmarks::listing_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if inserted == 0 {
            BookmarkInsert::AlreadyExists
        } else {
            BookmarkInsert::Inserted
        })
    }

    async fn remove(
        &self,
        tenant_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<bool, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            bookmarks::table
                .filter(bookmarks::tenant_id.eq(tenant_id.as_uuid()))
                .filter(bookmarks::listing_id.eq(listing_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn clear(&self, tenant_id: &UserId) -> Result<u64, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(bookmarks::table.filter(bookmarks::tenant_id.eq(tenant_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(removed).unwrap_or_default())
    }

    async fn list(&self, tenant_id: &UserId) -> Result<Vec<BookmarkEntry>, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookmarkRow> = bookmarks::table
            .filter(bookmarks::tenant_id.eq(tenant_id.as_uuid()))
            .order(bookmarks::id.desc())
            .select(BookmarkRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(BookmarkEntry::from).collect())
    }
}
