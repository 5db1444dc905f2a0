use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::info;
use validator::Validate;

use assessly_core::services::{EnsureProfileInput, EnsureProfileOutcome};

use crate::dto::EnsureProfileRequest;
use crate::middleware::AuthUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/auth/ensure-profile
///
/// The body is optional; an empty body means "use the token's metadata".
pub async fn ensure_profile(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<EnsureProfileOutcome>)> {
    let req: EnsureProfileRequest = if body.is_empty() {
        EnsureProfileRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };
    req.validate()?;

    let email = user
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Access token carries no email claim"))?;

    let outcome = state
        .profiles
        .ensure_profile(EnsureProfileInput {
            user_id: user.user_id,
            email,
            full_name: req.full_name.or_else(|| user.claims.full_name()),
            avatar_url: user.claims.avatar_url(),
            organization_name: req.organization_name,
        })
        .await?;

    let status = if outcome.created {
        info!("Provisioned profile for {}", user.user_id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}
