//! Conversions from port and validation errors into the domain [`Error`].
//!
//! Store connection failures become `service_unavailable`; every other store
//! failure becomes `internal_error`. Both are logged here so services can
//! propagate with `?` without losing the adapter's message.

use serde_json::json;
use tracing::error;

use super::Error;
use super::discovery::{SearchFilterError, UnknownBrowseSort};
use super::listing::ListingValidationError;
use super::ports::{
    AuditLogRepositoryError, BookmarkRepositoryError, ListingIndexRepositoryError,
    ListingRepositoryError, NotificationRepositoryError, ReportRepositoryError,
    ViewLogRepositoryError,
};
use super::report::ReportValidationError;

macro_rules! store_error_into_domain {
    ($($port_error:ident => $store:literal),+ $(,)?) => {
        $(
            impl From<$port_error> for Error {
                fn from(err: $port_error) -> Self {
                    match err {
                        $port_error::Connection { message } => {
                            error!(store = $store, %message, "store unavailable");
                            Error::service_unavailable(format!("{} unavailable", $store))
                        }
                        $port_error::Query { message } => {
                            error!(store = $store, %message, "store query failed");
                            Error::internal(format!("{} error: {message}", $store))
                        }
                    }
                }
            }
        )+
    };
}

store_error_into_domain! {
    ListingRepositoryError => "listing store",
    ListingIndexRepositoryError => "listing index",
    ViewLogRepositoryError => "view log",
    BookmarkRepositoryError => "bookmark store",
    ReportRepositoryError => "report ledger",
    AuditLogRepositoryError => "audit log",
    NotificationRepositoryError => "notification inbox",
}

impl From<ListingValidationError> for Error {
    fn from(err: ListingValidationError) -> Self {
        Self::invalid_request(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": err.code(),
        }))
    }
}

impl From<SearchFilterError> for Error {
    fn from(err: SearchFilterError) -> Self {
        let SearchFilterError::InvertedPriceRange { min, max } = err;
        Self::invalid_request(err.to_string()).with_details(json!({
            "field": "minPrice",
            "value": min,
            "maxPrice": max,
            "code": "inverted_price_range",
        }))
    }
}

impl From<UnknownBrowseSort> for Error {
    fn from(err: UnknownBrowseSort) -> Self {
        Self::invalid_request(err.to_string()).with_details(json!({
            "field": "sort",
            "value": err.0,
            "code": "unknown_sort",
        }))
    }
}

impl From<ReportValidationError> for Error {
    fn from(err: ReportValidationError) -> Self {
        let (field, code) = match &err {
            ReportValidationError::EmptyReason => ("reason", "missing_field"),
            ReportValidationError::ReasonTooLong { .. } => ("reason", "too_long"),
            ReportValidationError::UnknownStatus(_) => ("status", "unknown_status"),
        };
        Self::invalid_request(err.to_string()).with_details(json!({
            "field": field,
            "code": code,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn connection_failures_are_unavailable_and_hide_the_cause() {
        let err = Error::from(ListingRepositoryError::connection("pool timed out"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(!err.message().contains("pool timed out"));
    }

    #[rstest]
    fn query_failures_are_internal() {
        let err = Error::from(BookmarkRepositoryError::query("syntax error"));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn listing_validation_carries_field_details() {
        let err = Error::from(ListingValidationError::EmptyField { field: "title" });
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "title", "code": "missing_field"}))
        );
    }
}
