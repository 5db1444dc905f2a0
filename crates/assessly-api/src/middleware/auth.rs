//! Bearer token and organization scope extractors.
//!
//! ```ignore
//! async fn handler(OrgScope(scope): OrgScope) -> ApiResult<Json<Profile>> {
//!     scope.require_role(Role::Admin)?;
//!     ...
//! }
//! ```

use std::ops::Deref;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use assessly_core::{DomainError, PlatformScope, TenantScope};
use assessly_security::{extract_bearer, Claims};

use crate::response::ApiError;
use crate::state::AppState;

/// Verified Supabase user taken from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub user_metadata: Value,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = extract_bearer(header)
            .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))?;

        let claims = state.jwt.validate_token(token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ApiError::from(e)
        })?;
        let user_id = claims.user_id()?;

        Ok(AuthUser {
            user_id,
            email: claims.email.clone(),
            user_metadata: claims.user_metadata.clone(),
            claims,
        })
    }
}

/// Caller's organization and role. Requires an active profile attached to an
/// organization.
#[derive(Debug, Clone, Copy)]
pub struct OrgScope(pub TenantScope);

impl Deref for OrgScope {
    type Target = TenantScope;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for OrgScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let profile = state
            .profiles
            .find(&user.user_id)
            .await?
            .ok_or(DomainError::ProfileRequired)?;

        Ok(OrgScope(profile.scope()?))
    }
}

/// Platform operator: an organization admin whose token carries
/// `app_metadata.platform_admin = true`.
#[derive(Debug, Clone, Copy)]
pub struct PlatformAdmin(pub PlatformScope);

impl FromRequestParts<AppState> for PlatformAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let profile = state
            .profiles
            .find(&user.user_id)
            .await?
            .ok_or(DomainError::ProfileRequired)?;
        let scope = profile.scope()?;

        Ok(PlatformAdmin(PlatformScope::grant(
            &scope,
            user.claims.is_platform_admin(),
        )?))
    }
}
