use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::handlers::ensure_enabled;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<AppState>) -> ApiResult<Response> {
    ensure_enabled(state.config.features.prometheus, "prometheus")?;
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::InternalError(format!("Failed to encode metrics: {}", e)))?;
    Ok(([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response())
}
