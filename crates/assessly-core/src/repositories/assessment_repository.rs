//! Assessment repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use assessly_shared::Pagination;

use crate::domain::{Assessment, AssessmentFilter, AssessmentStats, AssessmentStatsFilter};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn find_by_id(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Assessment>, DomainError>;
    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &AssessmentFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Assessment>, i64), DomainError>;
    async fn create(&self, assessment: &Assessment) -> Result<Assessment, DomainError>;
    async fn update(&self, assessment: &Assessment) -> Result<Assessment, DomainError>;
    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError>;
    async fn stats(
        &self,
        organization_id: &Uuid,
        filter: &AssessmentStatsFilter,
    ) -> Result<AssessmentStats, DomainError>;
}
