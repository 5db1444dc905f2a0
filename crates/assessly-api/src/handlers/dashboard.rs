use axum::{extract::State, http::StatusCode, Json};

use assessly_core::{DashboardMetric, DashboardOverview, MetricBucket, MetricCalculation};

use crate::dto::{AggregateMetricsRequest, CalculateMetricsRequest, MetricListQuery, RecordMetricRequest};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::OrgScope;
use crate::response::ApiResult;
use crate::state::AppState;

pub async fn overview(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
) -> ApiResult<Json<DashboardOverview>> {
    Ok(Json(state.dashboard.overview(&scope).await?))
}

pub async fn list_metrics(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedQuery(query): ValidatedQuery<MetricListQuery>,
) -> ApiResult<Json<Vec<DashboardMetric>>> {
    Ok(Json(state.dashboard.list_metrics(&scope, query.into()).await?))
}

pub async fn record_metric(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<RecordMetricRequest>,
) -> ApiResult<(StatusCode, Json<DashboardMetric>)> {
    let metric = state.dashboard.record_metric(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

pub async fn aggregate(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<AggregateMetricsRequest>,
) -> ApiResult<Json<Vec<MetricBucket>>> {
    Ok(Json(state.dashboard.aggregate(&scope, req.into()).await?))
}

pub async fn calculate(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<CalculateMetricsRequest>,
) -> ApiResult<Json<Vec<MetricCalculation>>> {
    Ok(Json(state.dashboard.calculate(&scope, req.into()).await?))
}
