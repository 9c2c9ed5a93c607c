//! Shared Diesel error mapping for the repository adapters.
//!
//! Every driven port error exposes `connection` and `query` constructors, so
//! a single pair of mappers covers them all; `port_error_mappers!` stamps
//! out the per-repository `map_pool_error` / `map_diesel_error` functions.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// The database message is logged at debug level and never copied into the
/// returned error.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Convert a page request into SQL `LIMIT` / `OFFSET` values.
pub fn limit_offset(page: pagination::PageRequest) -> Result<(i64, i64), &'static str> {
    let offset = i64::try_from(page.offset()).map_err(|_| "page offset exceeds i64 range")?;
    Ok((i64::from(page.limit()), offset))
}

/// Convert a SQL count into the unsigned totals the ports report.
pub fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Generate `map_pool_error` and `map_diesel_error` for a port error type.
macro_rules! port_error_mappers {
    ($error:ident) => {
        fn map_pool_error(
            error: $crate::outbound::persistence::pool::PoolError,
        ) -> $error {
            $crate::outbound::persistence::diesel_basic_error_mapping::map_basic_pool_error(
                error,
                $error::connection,
            )
        }

        fn map_diesel_error(error: diesel::result::Error) -> $error {
            $crate::outbound::persistence::diesel_basic_error_mapping::map_basic_diesel_error(
                error,
                $error::query,
                $error::connection,
            )
        }
    };
}

pub(crate) use port_error_mappers;
