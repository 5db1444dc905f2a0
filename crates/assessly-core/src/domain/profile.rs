//! Profile domain entity
//!
//! A profile is the application-side record of a Supabase auth user. Its `id`
//! is the auth user id (the JWT `sub`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use assessly_shared::utils::email_local_part;

use crate::domain::{Role, TenantScope};
use crate::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Profile {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 120, message = "Full name must be between 1 and 120 characters"))]
    pub full_name: Option<String>,

    pub role: Role,
    pub is_active: bool,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,

    pub last_seen_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl ProfilePatch {
    /// Whether the patch touches fields only an admin may change.
    pub fn is_privileged(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.avatar_url.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    /// Case-insensitive match on email or full name.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserActivityFilter {
    pub seen_since: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserActivityStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub seen_recently: i64,
    pub admins: i64,
    pub managers: i64,
    pub members: i64,
    pub viewers: i64,
}

impl Profile {
    pub fn new(input: NewProfile) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let profile = Self {
            id: input.id,
            organization_id: input.organization_id,
            email: input.email.trim().to_lowercase(),
            full_name: input
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            role: input.role,
            is_active: true,
            avatar_url: input.avatar_url,
            last_seen_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        profile.validate()?;
        Ok(profile)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) => name.clone(),
            None => email_local_part(&self.email).to_string(),
        }
    }

    /// Tenant scope for requests made by this profile.
    pub fn scope(&self) -> Result<TenantScope, DomainError> {
        if self.is_deleted() {
            return Err(DomainError::ProfileRequired);
        }
        if !self.is_active {
            return Err(DomainError::AccountDisabled);
        }
        let organization_id = self.organization_id.ok_or(DomainError::NoOrganization)?;
        Ok(TenantScope::new(self.id, organization_id, self.role))
    }

    pub fn apply_patch(&mut self, patch: ProfilePatch) -> Result<(), validator::ValidationErrors> {
        if let Some(full_name) = patch.full_name {
            let trimmed = full_name.trim().to_string();
            self.full_name = (!trimmed.is_empty()).then_some(trimmed);
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = (!avatar_url.trim().is_empty()).then_some(avatar_url);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.is_active = false;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_profile(org: Option<Uuid>) -> Profile {
        Profile::new(NewProfile {
            id: Uuid::new_v4(),
            organization_id: org,
            email: "  Ana.Lima@Example.com ".to_string(),
            full_name: Some("  ".to_string()),
            role: Role::Member,
            avatar_url: None,
        })
        .unwrap()
    }

    #[test]
    fn test_new_profile_normalizes() {
        let profile = new_profile(None);
        assert_eq!(profile.email, "ana.lima@example.com");
        assert_eq!(profile.full_name, None);
        assert_eq!(profile.display_name(), "ana.lima");
        assert!(profile.is_active);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = Profile::new(NewProfile {
            id: Uuid::new_v4(),
            organization_id: None,
            email: "not-an-email".to_string(),
            full_name: None,
            role: Role::Viewer,
            avatar_url: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_scope_requires_organization_and_active() {
        let profile = new_profile(None);
        assert!(matches!(profile.scope(), Err(DomainError::NoOrganization)));

        let org = Uuid::new_v4();
        let mut profile = new_profile(Some(org));
        let scope = profile.scope().unwrap();
        assert_eq!(scope.organization_id, org);
        assert_eq!(scope.role, Role::Member);

        profile.is_active = false;
        assert!(matches!(profile.scope(), Err(DomainError::AccountDisabled)));

        profile.soft_delete();
        assert!(matches!(profile.scope(), Err(DomainError::ProfileRequired)));
    }

    #[test]
    fn test_apply_patch() {
        let mut profile = new_profile(Some(Uuid::new_v4()));
        let patch = ProfilePatch {
            full_name: Some(" Ana Lima ".into()),
            role: Some(Role::Manager),
            ..Default::default()
        };
        assert!(patch.is_privileged());
        profile.apply_patch(patch).unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Ana Lima"));
        assert_eq!(profile.role, Role::Manager);

        let bad = ProfilePatch {
            avatar_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(profile.apply_patch(bad).is_err());
    }
}
