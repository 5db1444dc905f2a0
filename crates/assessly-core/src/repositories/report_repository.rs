//! Report repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use assessly_shared::Pagination;

use crate::domain::{Report, ReportFilter};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn find_by_id(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Report>, DomainError>;
    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &ReportFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Report>, i64), DomainError>;
    async fn create(&self, report: &Report) -> Result<Report, DomainError>;
    async fn update(&self, report: &Report) -> Result<Report, DomainError>;
    /// Atomically move a report to `generating` unless a generation younger
    /// than `stale_after_secs` already holds it.
    /// `None` when the report is missing or another generation holds it.
    async fn begin_generation(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
        stale_after_secs: i64,
    ) -> Result<Option<Report>, DomainError>;
    /// Move a report still in `generating` to `failed`.
    async fn abort_generation(&self, organization_id: &Uuid, id: &Uuid, message: &str) -> Result<(), DomainError>;
    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError>;
    async fn count(&self, organization_id: &Uuid) -> Result<i64, DomainError>;
}
