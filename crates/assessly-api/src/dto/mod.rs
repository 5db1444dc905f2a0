//! Request DTOs
//!
//! Every body and query string is a `Deserialize + Validate` struct; the
//! `From` impls hand the validated values to the domain input types.

pub mod assessments;
pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod system;
pub mod users;

pub use assessments::{AssessmentListQuery, AssessmentStatsQuery, CreateAssessmentRequest, UpdateAssessmentRequest};
pub use auth::EnsureProfileRequest;
pub use dashboard::{AggregateMetricsRequest, CalculateMetricsRequest, MetricListQuery, RecordMetricRequest};
pub use reports::{CreateReportRequest, ReportListQuery};
pub use system::{PerformanceListQuery, RecordPerformanceRequest};
pub use users::{CreateUserRequest, UpdateUserRequest, UserListQuery};
