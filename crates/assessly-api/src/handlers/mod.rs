pub mod assessments;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod reports;
pub mod system;
pub mod users;
pub mod websocket;

use crate::response::{ApiError, ApiResult};

/// Disabled features answer 404 `FEATURE_DISABLED` instead of disappearing.
pub(crate) fn ensure_enabled(enabled: bool, feature: &'static str) -> ApiResult<()> {
    if enabled {
        Ok(())
    } else {
        Err(ApiError::FeatureDisabled(feature))
    }
}
