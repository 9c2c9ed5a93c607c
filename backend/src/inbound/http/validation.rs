//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query and path values are taken as strings and parsed here so every
//! rejection carries the same `{field, value, code}` details shape.

use pagination::{MAX_LIMIT, PageRequest};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidNumber,
    PageTooSmall,
    LimitTooSmall,
    LimitTooLarge,
    InvalidUuid,
    InvalidEnum,
    InvalidRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::PageTooSmall => "page_too_small",
            ErrorCode::LimitTooSmall => "limit_too_small",
            ErrorCode::LimitTooLarge => "limit_too_large",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidEnum => "invalid_value",
            ErrorCode::InvalidRange => "invalid_range",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(
    field: FieldName,
    code: ErrorCode,
    value: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

/// `page` and `limit` query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size (default 10, at most 50).
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

impl PageQuery {
    /// Validate into a [`PageRequest`].
    pub fn to_request(&self) -> Result<PageRequest, Error> {
        parse_page(self.page.as_deref(), self.limit.as_deref())
    }
}

pub(crate) fn parse_page(page: Option<&str>, limit: Option<&str>) -> Result<PageRequest, Error> {
    let page_field = FieldName::new("page");
    let limit_field = FieldName::new("limit");
    let page_number = parse_optional_u64(page, page_field)?;
    let limit_number = parse_optional_u64(limit, limit_field)?;

    let page = match page_number {
        None => None,
        Some(0) => {
            return Err(field_error(
                page_field,
                ErrorCode::PageTooSmall,
                "0",
                "page must be at least 1",
            ));
        }
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            field_error(
                page_field,
                ErrorCode::InvalidNumber,
                value.to_string(),
                "page is too large",
            )
        })?),
    };
    let limit = match limit_number {
        None => None,
        Some(0) => {
            return Err(field_error(
                limit_field,
                ErrorCode::LimitTooSmall,
                "0",
                "limit must be at least 1",
            ));
        }
        Some(value) if value > u64::from(MAX_LIMIT) => {
            return Err(field_error(
                limit_field,
                ErrorCode::LimitTooLarge,
                value.to_string(),
                format!("limit must be at most {MAX_LIMIT}"),
            ));
        }
        Some(value) => u32::try_from(value).ok(),
    };

    PageRequest::from_optional(page, limit).map_err(|error| Error::invalid_request(error.to_string()))
}

pub(crate) fn parse_optional_u64(value: Option<&str>, field: FieldName) -> Result<Option<u64>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<u64>().map(Some).map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidNumber,
            raw,
            format!("{} must be a non-negative integer", field.as_str()),
        )
    })
}

pub(crate) fn parse_optional_u32(value: Option<&str>, field: FieldName) -> Result<Option<u32>, Error> {
    parse_optional_u64(value, field)?
        .map(|number| {
            u32::try_from(number).map_err(|_| {
                field_error(
                    field,
                    ErrorCode::InvalidNumber,
                    number.to_string(),
                    format!("{} is too large", field.as_str()),
                )
            })
        })
        .transpose()
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidUuid,
            value,
            format!("{} must be a valid UUID", field.as_str()),
        )
    })
}

pub(crate) fn invalid_enum_error(field: FieldName, value: &str, expected: &str) -> Error {
    field_error(
        field,
        ErrorCode::InvalidEnum,
        value,
        format!("{} must be one of {expected}", field.as_str()),
    )
}

pub(crate) fn invalid_range_error(field: FieldName, value: String, message: String) -> Error {
    field_error(field, ErrorCode::InvalidRange, value, message)
}
