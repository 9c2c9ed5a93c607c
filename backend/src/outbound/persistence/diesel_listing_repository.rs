//! PostgreSQL-backed `ListingRepository`.
//!
//! Counter updates and availability flips are single conditional `UPDATE`
//! statements. Publishing writes the listing row and its index row in one
//! transaction, so the index only drifts for rows written before this
//! adapter existed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, exists};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::discovery::{
    BrowsePlan, FreeText, LocationFrequency, SearchCriteria, SearchOrder,
};
use crate::domain::ports::{
    AvailabilityChange, ListingPage, ListingRepository, ListingRepositoryError,
};
use crate::domain::{Availability, IndexEntry, Listing, ListingDetails, ListingId, UserId};

use super::diesel_basic_error_mapping::{count_to_total, limit_offset, port_error_mappers};
use super::models::{IndexEntryRow, ListingDetailsColumns, ListingRow, NewListingSystemColumns};
use super::pool::DbPool;
use super::schema::{listings, user_listing_index};

define_sql_function! {
    /// Uniform random sort key.
    fn random() -> diesel::sql_types::Double;
}

define_sql_function! {
    /// 1-based position of `elem` in `arr`, or `NULL`.
    fn array_position(
        arr: diesel::sql_types::Array<diesel::sql_types::Text>,
        elem: diesel::sql_types::Text,
    ) -> diesel::sql_types::Nullable<diesel::sql_types::Integer>;
}

define_sql_function! {
    /// Larger of two integers.
    fn greatest(a: diesel::sql_types::Integer, b: diesel::sql_types::Integer)
        -> diesel::sql_types::Integer;
}

type ListingPredicate = Box<dyn BoxableExpression<listings::table, Pg, SqlType = Bool>>;

/// Diesel-backed listing store.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

port_error_mappers!(ListingRepositoryError);

fn decode_rows(rows: Vec<ListingRow>) -> Result<Vec<Listing>, ListingRepositoryError> {
    rows.into_iter()
        .map(Listing::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ListingRepositoryError::query)
}

fn decode_row(row: Option<ListingRow>) -> Result<Option<Listing>, ListingRepositoryError> {
    row.map(Listing::try_from)
        .transpose()
        .map_err(ListingRepositoryError::query)
}

/// Escape `LIKE` metacharacters and wrap in wildcards.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn text_hit(needle: &str) -> ListingPredicate {
    let pattern = contains_pattern(needle);
    Box::new(
        listings::title
            .ilike(pattern.clone())
            .or(listings::description.assume_not_null().ilike(pattern.clone()))
            .or(listings::location.ilike(pattern)),
    )
}

fn free_text_predicate(text: &FreeText) -> ListingPredicate {
    text.words()
        .iter()
        .fold(text_hit(text.phrase()), |acc, word| {
            Box::new(acc.or(text_hit(word)))
        })
}

fn available_listings<'a>() -> listings::BoxedQuery<'a, Pg> {
    listings::table
        .filter(listings::is_available.eq(true))
        .into_boxed()
}

fn search_query<'a>(
    criteria: &SearchCriteria,
) -> Result<listings::BoxedQuery<'a, Pg>, ListingRepositoryError> {
    let mut query = available_listings();
    if let Some(title) = &criteria.title {
        query = query.filter(listings::title.ilike(contains_pattern(title)));
    }
    if let Some(location) = &criteria.location {
        query = query.filter(listings::location.ilike(contains_pattern(location)));
    }
    if let Some(kind) = &criteria.apartment_type {
        query = query.filter(listings::apartment_type.ilike(contains_pattern(kind)));
    }
    if let Some(min) = criteria.min_price {
        let min = i64::try_from(min).unwrap_or(i64::MAX);
        query = query.filter(listings::price.ge(min));
    }
    if let Some(max) = criteria.max_price {
        let max = i64::try_from(max).unwrap_or(i64::MAX);
        query = query.filter(listings::price.le(max));
    }
    if let Some(bedrooms) = criteria.bedrooms {
        let bedrooms = i32::try_from(bedrooms)
            .map_err(|_| ListingRepositoryError::query("bedroom filter out of range"))?;
        query = query.filter(listings::bedrooms.eq(bedrooms));
    }
    if let Some(text) = &criteria.text {
        query = query.filter(free_text_predicate(text));
    }
    Ok(query)
}

fn order_search(query: listings::BoxedQuery<'_, Pg>, order: SearchOrder) -> listings::BoxedQuery<'_, Pg> {
    let query = match order {
        SearchOrder::Newest => query.order(listings::created_at.desc()),
        SearchOrder::PriceAscending => query
            .order(listings::price.asc())
            .then_order_by(listings::created_at.desc()),
        SearchOrder::PriceDescending => query
            .order(listings::price.desc())
            .then_order_by(listings::created_at.desc()),
        SearchOrder::BedroomsAscending => query
            .order(listings::bedrooms.asc())
            .then_order_by(listings::created_at.desc()),
    };
    query.then_order_by(listings::id.asc())
}

fn order_browse<'a>(query: listings::BoxedQuery<'a, Pg>, plan: &BrowsePlan) -> listings::BoxedQuery<'a, Pg> {
    match plan {
        // `updated_at` starts equal to `created_at` and only moves forward,
        // so it is the later of the two.
        BrowsePlan::Recent => query
            .order(listings::updated_at.desc())
            .then_order_by(listings::id.asc()),
        BrowsePlan::Random => query.order(random()),
        BrowsePlan::Popular(ranking) => query
            .order(array_position(ranking.locations().to_vec(), listings::location).asc())
            .then_order_by(listings::created_at.desc())
            .then_order_by(listings::id.asc()),
    }
}

impl DieselListingRepository {
    async fn page(
        &self,
        count_query: listings::BoxedQuery<'_, Pg>,
        page_query: listings::BoxedQuery<'_, Pg>,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(ListingRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ListingRow> = page_query
            .select(ListingRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ListingPage {
            items: decode_rows(rows)?,
            total: count_to_total(total),
        })
    }
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let system = NewListingSystemColumns::encode(listing).map_err(ListingRepositoryError::query)?;
        let details =
            ListingDetailsColumns::encode(&listing.details).map_err(ListingRepositoryError::query)?;
        let index_row = IndexEntryRow::from(&IndexEntry::for_listing(listing));
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(listings::table)
                    .values((&system, &details))
                    .execute(conn)
                    .await?;
                diesel::insert_into(user_listing_index::table)
                    .values(&index_row)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = listings::table
            .find(id.as_uuid())
            .select(ListingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode_row(row)
    }

    async fn find_many(&self, ids: &[ListingId]) -> Result<Vec<Listing>, ListingRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = listings::table
            .filter(listings::id.eq_any(uuids))
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_rows(rows)
    }

    async fn update_details(
        &self,
        id: &ListingId,
        details: &ListingDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let columns = ListingDetailsColumns::encode(details).map_err(ListingRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(listings::table.find(id.as_uuid()))
            .set((&columns, listings::updated_at.eq(updated_at)))
            .returning(ListingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode_row(row)
    }

    async fn set_availability(
        &self,
        id: &ListingId,
        target: Availability,
        updated_at: DateTime<Utc>,
    ) -> Result<AvailabilityChange, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let flag = target.as_flag();
        let changed = diesel::update(
            listings::table
                .find(id.as_uuid())
                .filter(listings::is_available.ne(flag)),
        )
        .set((
            listings::is_available.eq(flag),
            listings::updated_at.eq(updated_at),
        ))
        .returning(ListingRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(listing) = decode_row(changed)? {
            return Ok(AvailabilityChange::Changed(listing));
        }

        let present: bool = diesel::select(exists(listings::table.find(id.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if present {
            AvailabilityChange::AlreadyInState
        } else {
            AvailabilityChange::Missing
        })
    }

    async fn increment_views(&self, id: &ListingId) -> Result<Option<u64>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let views: Option<i64> = diesel::update(listings::table.find(id.as_uuid()))
            .set(listings::views.eq(listings::views + 1))
            .returning(listings::views)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(views.map(count_to_total))
    }

    async fn adjust_report_count(
        &self,
        id: &ListingId,
        delta: i32,
    ) -> Result<Option<u32>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: Option<i32> = diesel::update(listings::table.find(id.as_uuid()))
            .set(listings::report_count.eq(greatest(listings::report_count + delta, 0)))
            .returning(listings::report_count)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(count.map(|value| u32::try_from(value).unwrap_or_default()))
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(listings::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn browse(
        &self,
        plan: &BrowsePlan,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError> {
        self.page(available_listings(), order_browse(available_listings(), plan), page)
            .await
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: PageRequest,
    ) -> Result<ListingPage, ListingRepositoryError> {
        let counted = search_query(criteria)?;
        let ordered = order_search(search_query(criteria)?, criteria.order);
        self.page(counted, ordered, page).await
    }

    async fn location_frequencies(&self) -> Result<Vec<LocationFrequency>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = listings::table
            .filter(listings::is_available.eq(true))
            .group_by(listings::location)
            .select((listings::location, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(location, count)| LocationFrequency {
                location,
                count: count_to_total(count),
            })
            .collect())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = listings::table
            .filter(listings::owner_id.eq(owner.as_uuid()))
            .order(listings::created_at.desc())
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_rows(rows)
    }
}
