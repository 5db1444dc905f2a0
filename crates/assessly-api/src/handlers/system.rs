use axum::{extract::State, http::StatusCode, Json};

use assessly_core::services::SystemPerformance;
use assessly_core::PerformanceMetric;

use crate::dto::{PerformanceListQuery, RecordPerformanceRequest};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::handlers::ensure_enabled;
use crate::middleware::PlatformAdmin;
use crate::response::ApiResult;
use crate::state::AppState;

pub async fn performance(
    State(state): State<AppState>,
    PlatformAdmin(scope): PlatformAdmin,
    ValidatedQuery(query): ValidatedQuery<PerformanceListQuery>,
) -> ApiResult<Json<SystemPerformance>> {
    ensure_enabled(state.config.features.system_performance, "system_performance")?;
    Ok(Json(state.system.performance(&scope, query.into()).await?))
}

pub async fn record_performance(
    State(state): State<AppState>,
    PlatformAdmin(scope): PlatformAdmin,
    ValidatedJson(req): ValidatedJson<RecordPerformanceRequest>,
) -> ApiResult<(StatusCode, Json<PerformanceMetric>)> {
    ensure_enabled(state.config.features.system_performance, "system_performance")?;
    let metric = state.system.record(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}
