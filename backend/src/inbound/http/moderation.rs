//! Reporting and administration handlers.
//!
//! ```text
//! POST   /api/v1/apartments/{id}/reports
//! GET    /api/v1/admin/reports?status&page&limit
//! PATCH  /api/v1/admin/reports/{id}/review
//! PATCH  /api/v1/admin/reports/{id}/resolve
//! DELETE /api/v1/admin/apartments/{id}
//! GET    /api/v1/admin/audit-log?page&limit
//! POST   /api/v1/admin/user-listings/{userId}/reconcile
//! ```

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::AdminContext;
use crate::domain::{AuditEntry, Caller, Error, Report, ReportId, ReportStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::{PageMeta, parse_listing_id};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_listings::parse_user_id;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_page, parse_uuid};

/// Report submission body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReportRequest {
    /// Why the listing is being reported; at most 500 characters.
    pub reason: Option<String>,
}

/// A filed report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub listing_id: String,
    pub reporter_id: String,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id.to_string(),
            listing_id: report.listing_id.to_string(),
            reporter_id: report.reporter_id.to_string(),
            reason: report.reason.as_str().to_owned(),
            status: report.status.to_string(),
            created_at: report.created_at.to_rfc3339(),
            resolved_at: report.resolved_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// A page of reports.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportsResponse {
    pub reports: Vec<ReportResponse>,
    #[serde(flatten)]
    pub page: PageMeta,
}

/// One administrative action.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: String,
    pub admin_id: String,
    #[schema(example = "delete_listing")]
    pub action: String,
    pub target: String,
    pub ip_address: Option<String>,
    pub created_at: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            admin_id: entry.admin_id.to_string(),
            action: entry.action.to_string(),
            target: entry.target,
            ip_address: entry.ip_address,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// A page of audit entries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntryResponse>,
    #[serde(flatten)]
    pub page: PageMeta,
}

/// Outcome of an index reconciliation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// Index entries written for listings that had none.
    pub appended: u64,
}

/// `GET /admin/reports` parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportsQuery {
    /// `pending`, `reviewed`, or `resolved`.
    pub status: Option<String>,
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

fn parse_report_id(raw: &str) -> Result<ReportId, Error> {
    parse_uuid(raw, FieldName::new("reportId")).map(ReportId::from_uuid)
}

fn admin_context(caller: Caller, req: &HttpRequest) -> AdminContext {
    AdminContext {
        caller,
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned),
    }
}

/// File a report against a listing.
#[utoipa::path(
    post,
    path = "/api/v1/apartments/{id}/reports",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = ReportRequest,
    responses(
        (status = 201, description = "Report filed", body = ReportResponse),
        (status = 400, description = "Invalid reason", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Tenants only", body = ErrorSchema),
        (status = 404, description = "Listing not found", body = ErrorSchema),
        (status = 409, description = "Already reported", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "reportListing"
)]
#[post("/apartments/{id}/reports")]
pub async fn report_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReportRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let listing_id = parse_listing_id(&path.into_inner())?;
    let reason = payload.into_inner().reason.unwrap_or_default();
    let report = state
        .moderation
        .report(&caller, &listing_id, reason)
        .await?;
    Ok(HttpResponse::Created().json(ReportResponse::from(report)))
}

/// List reports, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reports",
    params(ReportsQuery),
    responses(
        (status = 200, description = "Reports page", body = ReportsResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listReports"
)]
#[get("/admin/reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportsQuery>,
) -> ApiResult<web::Json<ReportsResponse>> {
    let caller = session.require_caller()?;
    let query = query.into_inner();
    let page = parse_page(query.page.as_deref(), query.limit.as_deref())?;
    let status = query
        .status
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(ReportStatus::from_str)
        .transpose()?;
    let Paginated { items, info } = state
        .moderation
        .list_reports(&caller, status, page)
        .await?;
    Ok(web::Json(ReportsResponse {
        reports: items.into_iter().map(ReportResponse::from).collect(),
        page: PageMeta::from(info),
    }))
}

/// Mark a pending report as reviewed.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/reports/{id}/review",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Reviewed report", body = ReportResponse),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Report not found", body = ErrorSchema),
        (status = 409, description = "Report is not pending", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "reviewReport"
)]
#[patch("/admin/reports/{id}/review")]
pub async fn review_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReportResponse>> {
    let caller = session.require_caller()?;
    let id = parse_report_id(&path.into_inner())?;
    let report = state.moderation.review(&caller, &id).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Resolve a report and release its hold on the listing's counter.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/reports/{id}/resolve",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Resolved report", body = ReportResponse),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Report not found", body = ErrorSchema),
        (status = 409, description = "Already resolved", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "resolveReport"
)]
#[patch("/admin/reports/{id}/resolve")]
pub async fn resolve_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReportResponse>> {
    let admin = admin_context(session.require_caller()?, &req);
    let id = parse_report_id(&path.into_inner())?;
    let report = state.moderation.resolve(&admin, &id).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Permanently remove a listing.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/apartments/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Listing not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteListing"
)]
#[delete("/admin/apartments/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = admin_context(session.require_caller()?, &req);
    let id = parse_listing_id(&path.into_inner())?;
    state.moderation.delete_listing(&admin, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Read the audit trail, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-log",
    params(PageQuery),
    responses(
        (status = 200, description = "Audit entries", body = AuditLogResponse),
        (status = 403, description = "Superadmins only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listAuditLog"
)]
#[get("/admin/audit-log")]
pub async fn audit_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<AuditLogResponse>> {
    let caller = session.require_caller()?;
    let page = query.to_request()?;
    let Paginated { items, info } = state.moderation.audit_log(&caller, page).await?;
    Ok(web::Json(AuditLogResponse {
        entries: items.into_iter().map(AuditEntryResponse::from).collect(),
        page: PageMeta::from(info),
    }))
}

/// Append index entries for any of the user's listings that lack one.
#[utoipa::path(
    post,
    path = "/api/v1/admin/user-listings/{userId}/reconcile",
    params(("userId" = String, Path, description = "Owner identifier")),
    responses(
        (status = 200, description = "Reconciliation outcome", body = ReconcileResponse),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "reconcileUserListings"
)]
#[post("/admin/user-listings/{user_id}/reconcile")]
pub async fn reconcile_index(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReconcileResponse>> {
    let admin = admin_context(session.require_caller()?, &req);
    let user_id = parse_user_id(&path.into_inner())?;
    let appended = state.moderation.reconcile_index(&admin, &user_id).await?;
    Ok(web::Json(ReconcileResponse { appended }))
}

#[cfg(test)]
#[path = "moderation_tests.rs"]
mod tests;
