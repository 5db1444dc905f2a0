//! Performance metric repository trait (port)

use async_trait::async_trait;

use crate::domain::{PerformanceMetric, PerformanceQuery};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait PerformanceRepository: Send + Sync {
    /// Newest first, at most `query.limit` rows.
    async fn list(&self, query: &PerformanceQuery) -> Result<Vec<PerformanceMetric>, DomainError>;
    async fn create(&self, metric: &PerformanceMetric) -> Result<PerformanceMetric, DomainError>;
}
