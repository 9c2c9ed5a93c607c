//! Listing DTOs, query parameters, and page envelopes.

use std::str::FromStr;

use pagination::{PageInfo, PageRequest, Paginated};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::discovery::SearchFilters;
use crate::domain::{
    ApartmentType, Error, Listing, ListingDetails, ListingId, ListingPatch, PaymentFrequency,
};
use crate::inbound::http::validation::{
    FieldName, parse_optional_u32, parse_optional_u64, parse_page, parse_uuid,
};

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `None` for absent or whitespace-only query values.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    value.ok_or_else(|| {
        Error::invalid_request(format!("missing required field: {field}")).with_details(
            serde_json::json!({
                "field": field,
                "code": "missing_field",
            }),
        )
    })
}

pub(crate) fn parse_listing_id(raw: &str) -> Result<ListingId, Error> {
    parse_uuid(raw, FieldName::new("listingId")).map(ListingId::from_uuid)
}

/// Request payload for publishing a listing.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2-bedroom")]
    pub apartment_type: Option<String>,
    pub price: Option<u64>,
    #[schema(example = "yearly")]
    pub payment_frequency: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub nearest_landmark: Option<String>,
    #[serde(default)]
    #[schema(max_items = 10)]
    pub images: Vec<String>,
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    pub size: Option<String>,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub service_charge: u64,
}

impl TryFrom<ListingRequest> for ListingDetails {
    type Error = Error;

    fn try_from(request: ListingRequest) -> Result<Self, Self::Error> {
        let apartment_type = required(request.apartment_type, "apartmentType")?;
        let payment_frequency = required(request.payment_frequency, "paymentFrequency")?;
        let price = request.price.ok_or_else(|| {
            Error::invalid_request("missing required field: price").with_details(
                serde_json::json!({
                    "field": "price",
                    "code": "missing_field",
                }),
            )
        })?;
        Ok(Self {
            title: required(request.title, "title")?,
            description: request.description,
            apartment_type: ApartmentType::from_str(&apartment_type)?,
            price,
            payment_frequency: PaymentFrequency::from_str(&payment_frequency)?,
            duration: required(request.duration, "duration")?,
            location: required(request.location, "location")?,
            address: required(request.address, "address")?,
            nearest_landmark: request.nearest_landmark,
            images: request.images,
            contact_phone: required(request.contact_phone, "contactPhone")?,
            amenities: request.amenities,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            size: request.size,
            furnished: request.furnished,
            service_charge: request.service_charge,
        })
    }
}

/// Partial update; absent fields keep their stored value and `null` clears
/// the optional ones.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatchRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub apartment_type: Option<String>,
    pub price: Option<u64>,
    pub payment_frequency: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub nearest_landmark: Option<Option<String>>,
    #[schema(max_items = 10)]
    pub images: Option<Vec<String>>,
    pub contact_phone: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub size: Option<Option<String>>,
    pub furnished: Option<bool>,
    pub service_charge: Option<u64>,
}

impl TryFrom<ListingPatchRequest> for ListingPatch {
    type Error = Error;

    fn try_from(request: ListingPatchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: request.title,
            description: request.description,
            apartment_type: request
                .apartment_type
                .as_deref()
                .map(ApartmentType::from_str)
                .transpose()?,
            price: request.price,
            payment_frequency: request
                .payment_frequency
                .as_deref()
                .map(PaymentFrequency::from_str)
                .transpose()?,
            duration: request.duration,
            location: request.location,
            address: request.address,
            nearest_landmark: request.nearest_landmark,
            images: request.images,
            contact_phone: request.contact_phone,
            amenities: request.amenities,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            size: request.size,
            furnished: request.furnished,
            service_charge: request.service_charge,
        })
    }
}

/// A listing as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub owner_id: String,
    pub owner_role: String,
    pub title: String,
    pub description: Option<String>,
    pub apartment_type: String,
    pub price: u64,
    pub payment_frequency: String,
    pub duration: String,
    pub location: String,
    pub address: String,
    pub nearest_landmark: Option<String>,
    pub images: Vec<String>,
    pub contact_phone: String,
    pub amenities: Vec<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub size: Option<String>,
    pub furnished: bool,
    pub service_charge: u64,
    pub is_available: bool,
    pub views: u64,
    pub verified: bool,
    pub report_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        let Listing {
            id,
            owner_id,
            owner_role,
            details,
            is_available,
            views,
            verified,
            report_count,
            created_at,
            updated_at,
        } = listing;
        Self {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            owner_role: owner_role.to_string(),
            title: details.title,
            description: details.description,
            apartment_type: details.apartment_type.to_string(),
            price: details.price,
            payment_frequency: details.payment_frequency.to_string(),
            duration: details.duration,
            location: details.location,
            address: details.address,
            nearest_landmark: details.nearest_landmark,
            images: details.images,
            contact_phone: details.contact_phone,
            amenities: details.amenities,
            bedrooms: details.bedrooms,
            bathrooms: details.bathrooms,
            size: details.size,
            furnished: details.furnished,
            service_charge: details.service_charge,
            is_available,
            views,
            verified,
            report_count,
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// `GET /apartments` parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrowseQuery {
    /// 1-based page number (default 1).
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size (default 10, at most 50).
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
    /// `recent` (default), `random`, or `popular`.
    pub sort: Option<String>,
}

/// Search parameters shared by every search endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchQuery {
    /// Title substring (per-user and bookmark search).
    pub title: Option<String>,
    /// Location substring.
    pub location: Option<String>,
    /// Apartment type substring.
    #[serde(alias = "apartment_type")]
    pub apartment_type: Option<String>,
    /// Inclusive lower price bound.
    #[serde(alias = "min_price")]
    #[param(value_type = Option<u64>)]
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    #[serde(alias = "max_price")]
    #[param(value_type = Option<u64>)]
    pub max_price: Option<String>,
    /// Exact bedroom count.
    #[param(value_type = Option<u32>)]
    pub bedrooms: Option<String>,
    /// Free-text keyword, for example `2 bedroom lekki`.
    pub keyword: Option<String>,
    /// Alias for `keyword`.
    pub q: Option<String>,
    /// 1-based page number (default 1).
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size (default 10, at most 50).
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

impl SearchQuery {
    /// Validate into domain filters plus a page window.
    pub fn parse(self) -> Result<(SearchFilters, PageRequest), Error> {
        let page = parse_page(self.page.as_deref(), self.limit.as_deref())?;
        let filters = SearchFilters {
            title: self.title,
            location: self.location,
            apartment_type: self.apartment_type,
            min_price: parse_optional_u64(self.min_price.as_deref(), FieldName::new("minPrice"))?,
            max_price: parse_optional_u64(self.max_price.as_deref(), FieldName::new("maxPrice"))?,
            bedrooms: parse_optional_u32(self.bedrooms.as_deref(), FieldName::new("bedrooms"))?,
            keyword: non_blank(self.keyword).or_else(|| non_blank(self.q)),
        };
        Ok((filters, page))
    }
}

/// Browse envelope: `hasMore` is `offset + returned < total`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub listings: Vec<ListingResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl From<Paginated<Listing>> for BrowseResponse {
    fn from(page: Paginated<Listing>) -> Self {
        let Paginated { items, info } = page;
        Self {
            listings: items.into_iter().map(ListingResponse::from).collect(),
            total: info.total,
            page: info.page,
            limit: info.limit,
            has_more: info.has_more,
        }
    }
}

/// Search envelope. An empty match is a success with `totalPages: 0`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<ListingResponse>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl From<Paginated<Listing>> for SearchResponse {
    fn from(page: Paginated<Listing>) -> Self {
        let Paginated { items, info } = page;
        Self {
            results: items.into_iter().map(ListingResponse::from).collect(),
            total: info.total,
            page: info.page,
            total_pages: info.total_pages,
            has_next_page: info.has_next_page,
            has_prev_page: info.has_prev_page,
        }
    }
}

/// Page position shared by the inbox, report, audit, and bookmark lists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl From<PageInfo> for PageMeta {
    fn from(info: PageInfo) -> Self {
        Self {
            total: info.total,
            page: info.page,
            limit: info.limit,
            total_pages: info.total_pages,
            has_next_page: info.has_next_page,
            has_prev_page: info.has_prev_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    fn full_request() -> serde_json::Value {
        json!({
            "title": "Cozy flat",
            "apartmentType": "2-bedroom",
            "price": 250000,
            "paymentFrequency": "yearly",
            "duration": "1 year",
            "location": "Lekki Phase 1",
            "address": "4 Admiralty Way",
            "contactPhone": "+2348000000000",
            "bedrooms": 2,
            "bathrooms": 2
        })
    }

    #[rstest]
    fn create_request_maps_to_details_with_defaults() {
        let request: ListingRequest = serde_json::from_value(full_request()).expect("decode");
        let details = ListingDetails::try_from(request).expect("valid details");
        assert_eq!(details.apartment_type, ApartmentType::TwoBedroom);
        assert_eq!(details.payment_frequency, PaymentFrequency::Yearly);
        assert!(details.images.is_empty());
        assert!(!details.furnished);
        assert_eq!(details.service_charge, 0);
    }

    #[rstest]
    #[case("title", "title")]
    #[case("contactPhone", "contactPhone")]
    #[case("price", "price")]
    fn missing_required_field_is_reported(#[case] remove: &str, #[case] field: &str) {
        let mut body = full_request();
        body.as_object_mut().expect("object").remove(remove);
        let request: ListingRequest = serde_json::from_value(body).expect("decode");
        let error = ListingDetails::try_from(request).expect_err("missing field");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], field);
    }

    #[rstest]
    fn unknown_apartment_type_is_invalid() {
        let mut body = full_request();
        body["apartmentType"] = json!("castle");
        let request: ListingRequest = serde_json::from_value(body).expect("decode");
        let error = ListingDetails::try_from(request).expect_err("unknown type");
        assert_eq!(error.details().expect("details")["code"], "unknown_apartment_type");
    }

    #[rstest]
    fn patch_distinguishes_null_from_absent() {
        let request: ListingPatchRequest =
            serde_json::from_value(json!({"description": null, "price": 1000})).expect("decode");
        let patch = ListingPatch::try_from(request).expect("valid patch");
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.nearest_landmark, None);
        assert_eq!(patch.price, Some(1000));
    }

    #[rstest]
    fn search_query_accepts_snake_case_aliases_and_q() {
        let query: SearchQuery = serde_json::from_value(json!({
            "apartment_type": "duplex",
            "min_price": "100000",
            "maxPrice": "300000",
            "q": "lekki",
        }))
        .expect("decode");
        let (filters, page) = query.parse().expect("valid query");
        assert_eq!(filters.apartment_type.as_deref(), Some("duplex"));
        assert_eq!(filters.min_price, Some(100_000));
        assert_eq!(filters.max_price, Some(300_000));
        assert_eq!(filters.keyword.as_deref(), Some("lekki"));
        assert_eq!(page, PageRequest::default());
    }

    #[rstest]
    #[case(json!({"keyword": "", "q": "lekki"}), Some("lekki"))]
    #[case(json!({"keyword": "   ", "q": "yaba"}), Some("yaba"))]
    #[case(json!({"keyword": "duplex", "q": "lekki"}), Some("duplex"))]
    #[case(json!({"keyword": "", "q": " "}), None)]
    fn blank_keyword_falls_back_to_q(#[case] raw: serde_json::Value, #[case] expected: Option<&str>) {
        let query: SearchQuery = serde_json::from_value(raw).expect("decode");
        let (filters, _) = query.parse().expect("valid query");
        assert_eq!(filters.keyword.as_deref(), expected);
    }

    #[rstest]
    fn search_query_rejects_non_numeric_price() {
        let query = SearchQuery {
            min_price: Some("cheap".to_owned()),
            ..SearchQuery::default()
        };
        let error = query.parse().expect_err("invalid price");
        assert_eq!(error.details().expect("details")["field"], "minPrice");
    }
}
