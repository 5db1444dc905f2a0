use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use assessly_core::Report;
use assessly_shared::Page;

use crate::dto::{CreateReportRequest, ReportListQuery};
use crate::extract::{ApiPath, ValidatedJson, ValidatedQuery};
use crate::handlers::ensure_enabled;
use crate::middleware::OrgScope;
use crate::response::ApiResult;
use crate::state::AppState;

pub async fn list_reports(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedQuery(query): ValidatedQuery<ReportListQuery>,
) -> ApiResult<Json<Page<Report>>> {
    ensure_enabled(state.config.features.reports, "reports")?;
    let page = state
        .reports
        .list_reports(&scope, &query.filter(), query.pagination())
        .await?;
    Ok(Json(page))
}

pub async fn create_report(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    ensure_enabled(state.config.features.reports, "reports")?;
    let report = state.reports.create_report(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get_report(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Report>> {
    ensure_enabled(state.config.features.reports, "reports")?;
    Ok(Json(state.reports.get_report(&scope, &id).await?))
}

pub async fn delete_report(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_enabled(state.config.features.reports, "reports")?;
    state.reports.delete_report(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs synchronously; the returned report is `completed` or `failed`.
pub async fn generate_report(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Report>> {
    ensure_enabled(state.config.features.reports, "reports")?;
    Ok(Json(state.reports.generate_report(&scope, &id).await?))
}
