//! # Assessly Core - Domain Module
//!
//! Domain entities for the Assessly application.

pub mod assessment;
pub mod dashboard_metric;
pub mod organization;
pub mod performance_metric;
pub mod profile;
pub mod report;
pub mod role;
pub mod scope;

pub use assessment::{
    Assessment, AssessmentFilter, AssessmentPatch, AssessmentStats, AssessmentStatsFilter,
    AssessmentStatus, NewAssessment,
};
pub use dashboard_metric::{
    AggregateFunction, AggregateInterval, AggregateRequest, BucketStats, DashboardMetric,
    DashboardOverview, MetricBucket, MetricCalculation, MetricQuery, NewMetric, WindowQuery,
    WindowStats,
};
pub use organization::{OrgPlan, Organization};
pub use performance_metric::{
    MetricUnit, NewPerformanceMetric, PerformanceMetric, PerformanceQuery, RuntimeSnapshot,
};
pub use profile::{NewProfile, Profile, ProfilePatch, UserActivityFilter, UserActivityStats, UserFilter};
pub use report::{NewReport, Report, ReportFilter, ReportStatus, ReportType};
pub use role::Role;
pub use scope::{PlatformScope, TenantScope};
