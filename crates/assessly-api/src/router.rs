use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, Uri},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info_span, warn};

use assessly_shared::constants::REQUEST_ID_HEADER;

use crate::handlers::{assessments, auth, dashboard, health, metrics, reports, system, users, websocket};
use crate::middleware::{rate_limit, track_requests};
use crate::response::ApiError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/api/health", get(health::health_check))
        .route("/api/version", get(health::version))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Authenticated
        .route("/api/websocket", get(websocket::websocket_info))
        .route("/api/auth/ensure-profile", post(auth::ensure_profile))
        // Organization scoped
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/assessments",
            get(assessments::list_assessments).post(assessments::create_assessment),
        )
        .route("/api/assessments/stats", get(assessments::assessment_stats))
        .route(
            "/api/assessments/{id}",
            get(assessments::get_assessment)
                .patch(assessments::update_assessment)
                .delete(assessments::delete_assessment),
        )
        .route("/api/dashboard/overview", get(dashboard::overview))
        .route(
            "/api/dashboard/metrics",
            get(dashboard::list_metrics).post(dashboard::record_metric),
        )
        .route("/api/dashboard/aggregate", post(dashboard::aggregate))
        .route("/api/dashboard/calculate", post(dashboard::calculate))
        .route("/api/reports", get(reports::list_reports).post(reports::create_report))
        .route(
            "/api/reports/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        .route("/api/reports/{id}/generate", post(reports::generate_report))
        .route(
            "/api/system/performance",
            get(system::performance).post(system::record_performance),
        )
        .fallback(route_not_found)
        .layer(from_fn_with_state(state.metrics.clone(), track_requests));

    if state.config.features.rate_limit {
        router = router.layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit));
    }

    let timeout = Duration::from_secs(state.config.app.request_timeout_secs);
    let cors = cors_layer(&state.config.app.cors_origins);

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
        )
        .with_state(state)
}

/// `*` (or nothing configured) allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
