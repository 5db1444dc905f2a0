// ============================================================================
// Assessly Core - Organization Entity
// File: crates/assessly-core/src/domain/organization.rs
// Description: Tenant entity; every tenant row points at one of these
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use assessly_shared::utils::slugify;

/// Subscription plan enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgPlan {
    Free,
    Team,
    Enterprise,
}

impl OrgPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgPlan::Free => "free",
            OrgPlan::Team => "team",
            OrgPlan::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(OrgPlan::Free),
            "team" => Some(OrgPlan::Team),
            "enterprise" => Some(OrgPlan::Enterprise),
            _ => None,
        }
    }
}

impl Default for OrgPlan {
    fn default() -> Self {
        OrgPlan::Free
    }
}

/// Organization entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Organization {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Organization name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 2, max = 120, message = "Slug must be between 2 and 120 characters"))]
    pub slug: String,

    pub plan: OrgPlan,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// New organization on the free plan. The slug is derived from the name and
    /// suffixed with part of the id so two tenants with the same name never collide.
    pub fn new(name: String) -> Result<Self, validator::ValidationErrors> {
        let id = Uuid::new_v4();
        let name = name.trim().to_string();
        let suffix: String = id.simple().to_string().chars().take(8).collect();
        let base = slugify(&name);
        let slug = if base.is_empty() {
            format!("org-{}", suffix)
        } else {
            format!("{}-{}", base, suffix)
        };
        let now = Utc::now();

        let organization = Self {
            id,
            name,
            slug,
            plan: OrgPlan::default(),
            created_at: now,
            updated_at: now,
        };

        organization.validate()?;
        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_organization() {
        let org = Organization::new("  Acme Analytics ".to_string()).unwrap();
        assert_eq!(org.name, "Acme Analytics");
        assert!(org.slug.starts_with("acme-analytics-"));
        assert_eq!(org.slug.len(), "acme-analytics-".len() + 8);
        assert_eq!(org.plan, OrgPlan::Free);
    }

    #[test]
    fn test_slug_fallback_for_symbol_names() {
        let org = Organization::new("%%".to_string()).unwrap();
        assert!(org.slug.starts_with("org-"));
    }

    #[test]
    fn test_name_too_short() {
        assert!(Organization::new("A".to_string()).is_err());
    }
}
