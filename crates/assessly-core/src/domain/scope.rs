//! Tenant scope of an authenticated request

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Role;
use crate::error::DomainError;

/// Who is calling and which organization every query must be confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenantScope {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

impl TenantScope {
    pub fn new(user_id: Uuid, organization_id: Uuid, role: Role) -> Self {
        Self { user_id, organization_id, role }
    }

    pub fn require_role(&self, required: Role) -> Result<(), DomainError> {
        if self.role.at_least(required) {
            Ok(())
        } else {
            Err(DomainError::InsufficientRole {
                required,
                actual: self.role,
            })
        }
    }

    pub fn is_self(&self, user_id: &Uuid) -> bool {
        self.user_id == *user_id
    }
}

/// Access to cross-tenant platform data: an organization admin whose auth
/// account also carries the platform operator flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformScope {
    pub user_id: Uuid,
}

impl PlatformScope {
    pub fn grant(scope: &TenantScope, platform_admin: bool) -> Result<Self, DomainError> {
        scope.require_role(Role::Admin)?;
        if !platform_admin {
            return Err(DomainError::PlatformAdminRequired);
        }
        Ok(Self { user_id: scope.user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_role() {
        let scope = TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), Role::Manager);
        assert!(scope.require_role(Role::Member).is_ok());
        assert!(scope.require_role(Role::Manager).is_ok());
        assert!(matches!(
            scope.require_role(Role::Admin),
            Err(DomainError::InsufficientRole { required: Role::Admin, actual: Role::Manager })
        ));
    }

    #[test]
    fn test_platform_scope_needs_org_admin_and_flag() {
        let admin = TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        let manager = TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), Role::Manager);

        assert_eq!(PlatformScope::grant(&admin, true).unwrap().user_id, admin.user_id);
        assert!(matches!(
            PlatformScope::grant(&admin, false),
            Err(DomainError::PlatformAdminRequired)
        ));
        assert!(matches!(
            PlatformScope::grant(&manager, true),
            Err(DomainError::InsufficientRole { .. })
        ));
    }
}
