//! Dashboard metric repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AggregateRequest, BucketStats, DashboardMetric, MetricQuery, WindowQuery, WindowStats};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn list(&self, organization_id: &Uuid, query: &MetricQuery) -> Result<Vec<DashboardMetric>, DomainError>;
    async fn create(&self, metric: &DashboardMetric) -> Result<DashboardMetric, DomainError>;
    /// `date_trunc` buckets over `[from, to)`, ordered by bucket.
    async fn aggregate(
        &self,
        organization_id: &Uuid,
        request: &AggregateRequest,
    ) -> Result<Vec<BucketStats>, DomainError>;
    /// One row per metric type that has samples in `[from, to)`.
    async fn window_stats(
        &self,
        organization_id: &Uuid,
        query: &WindowQuery,
    ) -> Result<Vec<WindowStats>, DomainError>;
}
