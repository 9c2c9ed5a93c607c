//! OpenAPI mirrors of the domain error envelope.
//!
//! [`crate::domain::Error`] stays free of utoipa derives; these stand-ins
//! describe its wire shape and are registered under the domain type's name.

use utoipa::ToSchema;

/// Wire form of [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Malformed input, such as a bad listing payload or page number.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No session accompanied a request that needs one.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Wrong role, or not the listing owner.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Unknown listing, report, or notification.
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate bookmark or report, or a no-op availability change.
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Wire form of [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    #[schema(example = "listing already reported")]
    message: String,
    /// Echo of the `trace-id` response header.
    #[schema(example = "6f1c2b1e-58a4-4f57-9d0b-2f4a1c9e7d30")]
    #[serde(rename = "traceId")]
    trace_id: Option<String>,
    /// Machine-readable context, e.g. `{"code": "already_reported"}`.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn code_schema_json() -> String {
        serde_json::to_string(&ErrorCodeSchema::schema()).expect("schema serialises")
    }

    #[test]
    fn schemas_register_under_domain_names() {
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
    }

    #[rstest]
    #[case(crate::domain::ErrorCode::InvalidRequest)]
    #[case(crate::domain::ErrorCode::Unauthorized)]
    #[case(crate::domain::ErrorCode::Forbidden)]
    #[case(crate::domain::ErrorCode::NotFound)]
    #[case(crate::domain::ErrorCode::Conflict)]
    #[case(crate::domain::ErrorCode::ServiceUnavailable)]
    #[case(crate::domain::ErrorCode::InternalError)]
    fn every_domain_code_is_documented(#[case] code: crate::domain::ErrorCode) {
        let wire = serde_json::to_value(code).expect("code serialises");
        let wire = wire.as_str().expect("codes serialise as strings");
        assert!(
            code_schema_json().contains(&format!("\"{wire}\"")),
            "{wire} missing from schema"
        );
    }
}
