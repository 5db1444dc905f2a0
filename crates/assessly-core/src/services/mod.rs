//! Domain services (business logic)
//!
//! Services check the caller's role, apply domain rules, and delegate storage
//! and arithmetic to the repository ports.

pub mod assessment_service;
pub mod dashboard_service;
pub mod profile_service;
pub mod report_generator;
pub mod reports_service;
pub mod system_service;
pub mod user_service;

pub use assessment_service::AssessmentService;
pub use dashboard_service::{CalculateRequest, DashboardService};
pub use profile_service::{EnsureProfileInput, EnsureProfileOutcome, ProfileService};
pub use report_generator::{DefaultReportGenerator, ReportGenerator};
pub use reports_service::ReportsService;
pub use system_service::{RuntimeStats, SystemPerformance, SystemService};
pub use user_service::{CreateUserInput, UserService};

#[cfg(any(test, feature = "mocks"))]
pub use report_generator::MockReportGenerator;
#[cfg(any(test, feature = "mocks"))]
pub use system_service::MockRuntimeStats;
