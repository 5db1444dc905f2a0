//! Profile repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use assessly_shared::Pagination;

use crate::domain::{Organization, Profile, UserActivityFilter, UserActivityStats, UserFilter};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Live profile by auth user id, regardless of organization.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Profile>, DomainError>;
    /// Like `find_by_id` but also returns soft-deleted rows.
    async fn find_by_id_with_deleted(&self, id: &Uuid) -> Result<Option<Profile>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError>;
    async fn find_in_org(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Profile>, DomainError>;
    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &UserFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Profile>, i64), DomainError>;
    async fn create(&self, profile: &Profile) -> Result<Profile, DomainError>;
    /// Insert a new organization and its first profile in one transaction.
    async fn create_with_organization(
        &self,
        organization: &Organization,
        profile: &Profile,
    ) -> Result<(Organization, Profile), DomainError>;
    /// Insert a new organization and move an existing profile into it, in one
    /// transaction. Only the role and `updated_at` of `profile` are written.
    async fn attach_organization(
        &self,
        organization: &Organization,
        profile: &Profile,
    ) -> Result<(Organization, Profile), DomainError>;
    /// Update a profile that belongs to `organization_id`.
    async fn update(&self, organization_id: &Uuid, profile: &Profile) -> Result<Profile, DomainError>;
    /// Re-key a pre-provisioned profile to the auth user id in `profile.id`.
    async fn reassign(&self, previous_id: &Uuid, profile: &Profile) -> Result<Profile, DomainError>;
    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError>;
    async fn touch_last_seen(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn activity_stats(
        &self,
        organization_id: &Uuid,
        filter: &UserActivityFilter,
    ) -> Result<UserActivityStats, DomainError>;
}
