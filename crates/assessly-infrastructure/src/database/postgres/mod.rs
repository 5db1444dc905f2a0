//! PostgreSQL repository implementations

pub mod assessment_repo_impl;
pub mod metric_repo_impl;
pub mod organization_repo_impl;
pub mod performance_repo_impl;
pub mod profile_repo_impl;
pub mod report_repo_impl;

pub use assessment_repo_impl::PgAssessmentRepository;
pub use metric_repo_impl::PgMetricRepository;
pub use organization_repo_impl::PgOrganizationRepository;
pub use performance_repo_impl::PgPerformanceRepository;
pub use profile_repo_impl::PgProfileRepository;
pub use report_repo_impl::PgReportRepository;

/// Unique-constraint violation (SQLSTATE 23505) on the named constraint.
pub(crate) fn is_unique_violation(error: &sqlx::Error, constraint: &str) -> bool {
    match error {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}
