//! PostgreSQL-backed `NotificationRepository`.
//!
//! Expired rows are filtered on read; nothing here deletes them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::diesel_basic_error_mapping::{count_to_total, limit_offset, port_error_mappers};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed notification inbox.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(NotificationRepositoryError);

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let row = NotificationRow::try_from(notification).map_err(NotificationRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Notification>, u64), NotificationRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(NotificationRepositoryError::query)?;
        let owner = *user_id.as_uuid();
        let live = || {
            let mut query = notifications::table
                .filter(notifications::user_id.eq(owner))
                .filter(notifications::expires_at.gt(now))
                .into_boxed();
            if unread_only {
                query = query.filter(notifications::read.eq(false));
            }
            query
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = live()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<NotificationRow> = live()
            .order((notifications::created_at.desc(), notifications::id.asc()))
            .select(NotificationRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(NotificationRepositoryError::query)?;
        Ok((items, count_to_total(total)))
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .find(id.as_uuid())
                .filter(notifications::user_id.eq(user_id.as_uuid())),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id.as_uuid()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or_default())
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            notifications::table
                .find(id.as_uuid())
                .filter(notifications::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
