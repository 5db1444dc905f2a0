// ============================================================================
// Assessly Core - Profile Service
// File: crates/assessly-core/src/services/profile_service.rs
// ============================================================================
//! First-login provisioning: make sure an authenticated Supabase user has a
//! profile and an organization.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use assessly_shared::utils::{email_local_part, mask_email};

use crate::domain::{NewProfile, Organization, Profile, Role};
use crate::error::DomainError;
use crate::repositories::{OrganizationRepository, ProfileRepository};

/// Identity taken from the verified access token plus optional request fields.
#[derive(Debug, Clone)]
pub struct EnsureProfileInput {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnsureProfileOutcome {
    pub profile: Profile,
    pub organization: Option<Organization>,
    pub created: bool,
}

pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self { profiles, organizations }
    }

    /// Profile lookup used by the request scope extractor.
    pub async fn find(&self, user_id: &Uuid) -> Result<Option<Profile>, DomainError> {
        self.profiles.find_by_id(user_id).await
    }

    /// Return the caller's profile, creating it (and a personal organization) on
    /// first login.
    ///
    /// A profile pre-provisioned by an admin under the same email is claimed:
    /// its id is rewritten to the auth user id. Deleted or deactivated accounts
    /// are refused instead of being provisioned again.
    pub async fn ensure_profile(
        &self,
        input: EnsureProfileInput,
    ) -> Result<EnsureProfileOutcome, DomainError> {
        // 1. Existing profile for this auth user, including soft-deleted rows
        if let Some(profile) = self.profiles.find_by_id_with_deleted(&input.user_id).await? {
            Self::ensure_usable(&profile)?;
            self.touch_last_seen(&profile.id).await;
            return self.with_organization(profile, &input).await;
        }

        // 2. Pre-provisioned profile waiting for this email
        if let Some(invited) = self.profiles.find_by_email(&input.email).await? {
            Self::ensure_usable(&invited)?;
            info!(
                "Claiming pre-provisioned profile {} for {}",
                invited.id,
                mask_email(&input.email)
            );
            let mut claimed = invited.clone();
            claimed.id = input.user_id;
            if claimed.full_name.is_none() {
                claimed.full_name = input.full_name.clone();
            }
            if claimed.avatar_url.is_none() {
                claimed.avatar_url = input.avatar_url.clone();
            }
            claimed.last_seen_at = Some(Utc::now());
            claimed.updated_at = Utc::now();
            let claimed = self.profiles.reassign(&invited.id, &claimed).await?;
            return self.with_organization(claimed, &input).await;
        }

        // 3. Brand new user: personal organization + admin profile, one transaction
        let organization = new_organization(&input)?;
        let mut profile = Profile::new(NewProfile {
            id: input.user_id,
            organization_id: Some(organization.id),
            email: input.email.clone(),
            full_name: input.full_name.clone(),
            role: Role::Admin,
            avatar_url: input.avatar_url.clone(),
        })?;
        profile.last_seen_at = Some(Utc::now());

        let (organization, profile) = match self
            .profiles
            .create_with_organization(&organization, &profile)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                // A concurrent first login for the same user may have won the insert
                return match self.profiles.find_by_id(&input.user_id).await? {
                    Some(existing) => {
                        info!("Profile {} was provisioned concurrently", existing.id);
                        self.with_organization(existing, &input).await
                    }
                    None => Err(e),
                };
            }
        };

        info!(
            "Provisioned profile {} ({}) with organization {}",
            profile.id,
            mask_email(&profile.email),
            organization.id
        );

        Ok(EnsureProfileOutcome {
            profile,
            organization: Some(organization),
            created: true,
        })
    }

    fn ensure_usable(profile: &Profile) -> Result<(), DomainError> {
        if profile.is_deleted() || !profile.is_active {
            warn!("Refusing provisioning for disabled profile {}", profile.id);
            return Err(DomainError::AccountDisabled);
        }
        Ok(())
    }

    async fn with_organization(
        &self,
        profile: Profile,
        input: &EnsureProfileInput,
    ) -> Result<EnsureProfileOutcome, DomainError> {
        let (profile, organization) = match profile.organization_id {
            Some(org_id) => {
                let organization = self.organizations.find_by_id(&org_id).await?;
                (profile, organization)
            }
            None => {
                let organization = new_organization(input)?;
                let mut attached = profile;
                attached.role = Role::Admin;
                attached.updated_at = Utc::now();
                let (organization, attached) = self
                    .profiles
                    .attach_organization(&organization, &attached)
                    .await?;
                info!("Attached organization {} to profile {}", organization.id, attached.id);
                (attached, Some(organization))
            }
        };

        Ok(EnsureProfileOutcome {
            profile,
            organization,
            created: false,
        })
    }

    async fn touch_last_seen(&self, user_id: &Uuid) {
        if let Err(e) = self.profiles.touch_last_seen(user_id, Utc::now()).await {
            warn!("Failed to update last_seen_at for {}: {}", user_id, e);
        }
    }
}

fn new_organization(input: &EnsureProfileInput) -> Result<Organization, DomainError> {
    let name = match input
        .organization_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        Some(name) => name.to_string(),
        None => {
            let owner = input
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| email_local_part(&input.email));
            format!("{}'s Organization", owner)
        }
    };
    Ok(Organization::new(name)?)
}
