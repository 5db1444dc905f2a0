use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRef;
use chrono::Duration;

use assessly_core::repositories::Repositories;
use assessly_core::services::{
    AssessmentService, DashboardService, DefaultReportGenerator, ProfileService, ReportsService,
    SystemService, UserService,
};
use assessly_infrastructure::DbPool;
use assessly_security::JwtService;
use assessly_shared::config::AppConfig;

use crate::middleware::metrics::RequestMetrics;
use crate::middleware::rate_limit::ClientRateLimiter;
use crate::response::ApiError;

/// Liveness check used by `/api/health`.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), String>;
}

#[async_trait]
impl DatabaseProbe for DbPool {
    async fn ping(&self) -> Result<(), String> {
        DbPool::ping(self).await.map_err(|e| e.to_string())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtService>,
    pub profiles: Arc<ProfileService>,
    pub users: Arc<UserService>,
    pub assessments: Arc<AssessmentService>,
    pub dashboard: Arc<DashboardService>,
    pub reports: Arc<ReportsService>,
    pub system: Arc<SystemService>,
    pub metrics: Arc<RequestMetrics>,
    pub rate_limiter: Arc<ClientRateLimiter>,
    pub database: Arc<dyn DatabaseProbe>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repos: Repositories,
        database: Arc<dyn DatabaseProbe>,
    ) -> Result<Self, ApiError> {
        let metrics = Arc::new(
            RequestMetrics::new()
                .map_err(|e| ApiError::InternalError(format!("metrics registry: {}", e)))?,
        );

        // Capped at a year
        let stale_after =
            Duration::seconds(config.reports.generation_stale_after_secs.min(31_536_000) as i64);
        let generator = Arc::new(DefaultReportGenerator::new(
            repos.assessments.clone(),
            repos.profiles.clone(),
            repos.metrics.clone(),
        ));

        Ok(Self {
            jwt: Arc::new(JwtService::from_settings(&config.supabase)),
            rate_limiter: Arc::new(ClientRateLimiter::new(&config.rate_limit)),
            profiles: Arc::new(ProfileService::new(
                repos.profiles.clone(),
                repos.organizations.clone(),
            )),
            users: Arc::new(UserService::new(repos.profiles.clone())),
            assessments: Arc::new(AssessmentService::new(
                repos.assessments.clone(),
                repos.profiles.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(
                repos.metrics.clone(),
                repos.profiles.clone(),
                repos.assessments.clone(),
                repos.reports.clone(),
            )),
            reports: Arc::new(ReportsService::new(
                repos.reports.clone(),
                generator,
                stale_after,
            )),
            system: Arc::new(SystemService::new(repos.performance.clone(), metrics.clone())),
            metrics,
            database,
            config: Arc::new(config),
        })
    }
}

impl FromRef<AppState> for Arc<RequestMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl FromRef<AppState> for Arc<ClientRateLimiter> {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}
