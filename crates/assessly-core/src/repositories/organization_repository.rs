//! Organization repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Organization;
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Organization>, DomainError>;
}
