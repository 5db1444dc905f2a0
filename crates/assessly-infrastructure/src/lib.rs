//! # Assessly Infrastructure
//!
//! PostgreSQL adapters for the repository ports in `assessly-core`.

pub mod database;

pub use database::{
    create_pool, run_migrations, DbPool, PgAssessmentRepository, PgMetricRepository,
    PgOrganizationRepository, PgPerformanceRepository, PgProfileRepository, PgReportRepository,
};

use assessly_core::repositories::Repositories;
use std::sync::Arc;

/// Wire every Postgres adapter onto one pool.
pub fn postgres_repositories(pool: &DbPool) -> Repositories {
    let pg = pool.get_pool().clone();
    Repositories {
        profiles: Arc::new(PgProfileRepository::new(pg.clone())),
        organizations: Arc::new(PgOrganizationRepository::new(pg.clone())),
        assessments: Arc::new(PgAssessmentRepository::new(pg.clone())),
        metrics: Arc::new(PgMetricRepository::new(pg.clone())),
        reports: Arc::new(PgReportRepository::new(pg.clone())),
        performance: Arc::new(PgPerformanceRepository::new(pg)),
    }
}
