//! Notification inbox handlers.
//!
//! ```text
//! GET    /api/v1/notifications?page&limit&unreadOnly
//! PATCH  /api/v1/notifications/read-all
//! PATCH  /api/v1/notifications/{id}/read
//! DELETE /api/v1/notifications/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::PageMeta;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_enum_error, parse_page, parse_uuid};

/// Listing context of a notification.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMetaResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One inbox item.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    pub meta: NotificationMetaResponse,
    pub read: bool,
    pub created_at: String,
    pub expires_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(item: Notification) -> Self {
        Self {
            id: item.id.to_string(),
            message: item.message,
            meta: NotificationMetaResponse {
                listing_id: item.meta.listing_id.map(|id| id.to_string()),
                title: item.meta.title,
                location: item.meta.location,
            },
            read: item.read,
            created_at: item.created_at.to_rfc3339(),
            expires_at: item.expires_at.to_rfc3339(),
        }
    }
}

/// A page of inbox items, newest first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
    #[serde(flatten)]
    pub page: PageMeta,
}

/// Count of items flipped to read.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// `GET /notifications` parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct InboxQuery {
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
    /// Only unread items when `true`.
    #[param(value_type = Option<bool>)]
    pub unread_only: Option<String>,
}

fn parse_flag(raw: Option<&str>) -> Result<bool, Error> {
    match raw.map(str::trim) {
        None | Some("" | "false" | "0") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some(other) => Err(invalid_enum_error(
            FieldName::new("unreadOnly"),
            other,
            "true, false",
        )),
    }
}

fn parse_notification_id(raw: &str) -> Result<NotificationId, Error> {
    parse_uuid(raw, FieldName::new("notificationId")).map(NotificationId::from_uuid)
}

/// The caller's unexpired notifications.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(InboxQuery),
    responses(
        (status = 200, description = "Inbox page", body = NotificationsResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<InboxQuery>,
) -> ApiResult<web::Json<NotificationsResponse>> {
    let caller = session.require_caller()?;
    let query = query.into_inner();
    let page = parse_page(query.page.as_deref(), query.limit.as_deref())?;
    let unread_only = parse_flag(query.unread_only.as_deref())?;
    let Paginated { items, info } = state
        .notifications
        .list(&caller, unread_only, page)
        .await?;
    Ok(web::Json(NotificationsResponse {
        notifications: items.into_iter().map(NotificationResponse::from).collect(),
        page: PageMeta::from(info),
    }))
}

/// Mark every unread item as read.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Items updated", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[patch("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let caller = session.require_caller()?;
    let updated = state.notifications.mark_all_read(&caller).await?;
    Ok(web::Json(MarkAllReadResponse { updated }))
}

/// Mark one item as read.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not in the caller's inbox", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[patch("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let id = parse_notification_id(&path.into_inner())?;
    state.notifications.mark_read(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete one item.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not in the caller's inbox", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let id = parse_notification_id(&path.into_inner())?;
    state.notifications.delete(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
