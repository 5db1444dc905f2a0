//! Repository traits (ports)
//!
//! Every tenant-data method takes the organization id explicitly; adapters must
//! filter on it and on `deleted_at IS NULL`.

pub mod assessment_repository;
pub mod metric_repository;
pub mod organization_repository;
pub mod performance_repository;
pub mod profile_repository;
pub mod report_repository;

use std::sync::Arc;

pub use assessment_repository::AssessmentRepository;
pub use metric_repository::MetricRepository;
pub use organization_repository::OrganizationRepository;
pub use performance_repository::PerformanceRepository;
pub use profile_repository::ProfileRepository;
pub use report_repository::ReportRepository;

#[cfg(any(test, feature = "mocks"))]
pub use assessment_repository::MockAssessmentRepository;
#[cfg(any(test, feature = "mocks"))]
pub use metric_repository::MockMetricRepository;
#[cfg(any(test, feature = "mocks"))]
pub use organization_repository::MockOrganizationRepository;
#[cfg(any(test, feature = "mocks"))]
pub use performance_repository::MockPerformanceRepository;
#[cfg(any(test, feature = "mocks"))]
pub use profile_repository::MockProfileRepository;
#[cfg(any(test, feature = "mocks"))]
pub use report_repository::MockReportRepository;

/// Every adapter the services need, bundled for wiring.
#[derive(Clone)]
pub struct Repositories {
    pub profiles: Arc<dyn ProfileRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
    pub metrics: Arc<dyn MetricRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub performance: Arc<dyn PerformanceRepository>,
}
