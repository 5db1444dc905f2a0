// ============================================================================
// Assessly Core - User Service
// File: crates/assessly-core/src/services/user_service.rs
// Description: Organization member management
// ============================================================================

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use assessly_shared::utils::mask_email;
use assessly_shared::{Page, Pagination};

use crate::domain::{NewProfile, Profile, ProfilePatch, Role, TenantScope, UserFilter};
use crate::error::DomainError;
use crate::repositories::ProfileRepository;

/// Admin-provisioned member. The profile is claimed on the member's first login.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
}

pub struct UserService {
    profiles: Arc<dyn ProfileRepository>,
}

impl UserService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn list_users(
        &self,
        scope: &TenantScope,
        filter: &UserFilter,
        pagination: Pagination,
    ) -> Result<Page<Profile>, DomainError> {
        let (items, total) = self
            .profiles
            .list(&scope.organization_id, filter, pagination)
            .await?;
        Ok(Page::new(items, total, pagination))
    }

    pub async fn get_user(&self, scope: &TenantScope, id: &Uuid) -> Result<Profile, DomainError> {
        self.profiles
            .find_in_org(&scope.organization_id, id)
            .await?
            .ok_or(DomainError::UserNotFound(*id))
    }

    pub async fn create_user(
        &self,
        scope: &TenantScope,
        input: CreateUserInput,
    ) -> Result<Profile, DomainError> {
        scope.require_role(Role::Admin)?;

        let email = input.email.trim().to_lowercase();
        if self.profiles.find_by_email(&email).await?.is_some() {
            return Err(DomainError::EmailAlreadyExists(email));
        }

        let profile = Profile::new(NewProfile {
            id: Uuid::new_v4(),
            organization_id: Some(scope.organization_id),
            email,
            full_name: input.full_name,
            role: input.role,
            avatar_url: None,
        })?;
        let profile = self.profiles.create(&profile).await?;

        info!(
            "User {} ({}) provisioned by {}",
            profile.id,
            mask_email(&profile.email),
            scope.user_id
        );
        Ok(profile)
    }

    /// Members may edit their own name and avatar; role and activation changes
    /// need an admin, and an admin cannot demote or deactivate themselves.
    pub async fn update_user(
        &self,
        scope: &TenantScope,
        id: &Uuid,
        patch: ProfilePatch,
    ) -> Result<Profile, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::ValidationError("No fields to update".to_string()));
        }

        if patch.is_privileged() || !scope.is_self(id) {
            scope.require_role(Role::Admin)?;
        }
        if scope.is_self(id) {
            let demotes = patch.role.is_some_and(|r| r != Role::Admin);
            let deactivates = patch.is_active == Some(false);
            if demotes || deactivates {
                return Err(DomainError::ValidationError(
                    "Admins cannot demote or deactivate themselves".to_string(),
                ));
            }
        }

        let mut profile = self.get_user(scope, id).await?;
        profile.apply_patch(patch)?;
        self.profiles.update(&scope.organization_id, &profile).await
    }

    pub async fn delete_user(&self, scope: &TenantScope, id: &Uuid) -> Result<(), DomainError> {
        scope.require_role(Role::Admin)?;
        if scope.is_self(id) {
            return Err(DomainError::ValidationError(
                "Admins cannot delete themselves".to_string(),
            ));
        }

        if !self.profiles.soft_delete(&scope.organization_id, id).await? {
            return Err(DomainError::UserNotFound(*id));
        }
        info!("User {} deleted by {}", id, scope.user_id);
        Ok(())
    }
}
