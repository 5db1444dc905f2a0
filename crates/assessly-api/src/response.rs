//! API error responses
//!
//! Every failure leaves the server as
//! `{"success": false, "error": {"code", "message", "details"?}, "timestamp"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use assessly_core::DomainError;
use assessly_security::JwtError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {message}")]
    Forbidden { code: &'static str, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::FeatureDisabled(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden { code, .. } => code,
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::FeatureDisabled(_) => "FEATURE_DISABLED",
            ApiError::Conflict { code, .. } => code,
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
    timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::Validation { message, details } => {
                tracing::warn!("Validation error: {}", message);
                (message, details)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (msg, None)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (msg, None)
            }
            ApiError::Forbidden { message, .. } => {
                tracing::warn!("Forbidden ({}): {}", code, message);
                (message, None)
            }
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (msg, None)
            }
            ApiError::FeatureDisabled(feature) => {
                tracing::debug!("Feature disabled: {}", feature);
                (format!("The {} feature is disabled", feature), None)
            }
            ApiError::Conflict { message, .. } => {
                tracing::warn!("Conflict ({}): {}", code, message);
                (message, None)
            }
            ApiError::RateLimited => ("Too many requests".to_string(), None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (msg, None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                code,
                message,
                details,
            },
            timestamp: Utc::now().to_rfc3339(),
        });

        (status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let message = error.to_string();
        match error {
            DomainError::UserNotFound(_)
            | DomainError::AssessmentNotFound(_)
            | DomainError::ReportNotFound(_) => ApiError::NotFound(message),
            DomainError::ProfileRequired => ApiError::Forbidden {
                code: "PROFILE_REQUIRED",
                message,
            },
            DomainError::NoOrganization => ApiError::Forbidden {
                code: "NO_ORGANIZATION",
                message,
            },
            DomainError::AccountDisabled => ApiError::Forbidden {
                code: "ACCOUNT_DISABLED",
                message,
            },
            DomainError::InsufficientRole { .. } => ApiError::Forbidden {
                code: "INSUFFICIENT_ROLE",
                message,
            },
            DomainError::PlatformAdminRequired => ApiError::Forbidden {
                code: "PLATFORM_ADMIN_REQUIRED",
                message,
            },
            DomainError::EmailAlreadyExists(_) | DomainError::OrganizationSlugAlreadyExists(_) => {
                ApiError::Conflict {
                    code: "CONFLICT",
                    message,
                }
            }
            DomainError::InvalidStatusTransition { .. } => ApiError::Conflict {
                code: "INVALID_STATUS_TRANSITION",
                message,
            },
            DomainError::ReportAlreadyGenerating(_) => ApiError::Conflict {
                code: "REPORT_GENERATING",
                message,
            },
            DomainError::ValidationError(msg) => ApiError::validation(msg),
            DomainError::ReportGenerationFailed(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(message),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(error: JwtError) -> Self {
        ApiError::Unauthorized(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), Value::from(messages))
            })
            .collect::<serde_json::Map<_, _>>();

        ApiError::Validation {
            message: "Request validation failed".to_string(),
            details: Some(Value::Object(details)),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assessly_core::{AssessmentStatus, Role};
    use uuid::Uuid;

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (DomainError::UserNotFound(Uuid::nil()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (DomainError::ProfileRequired, StatusCode::FORBIDDEN, "PROFILE_REQUIRED"),
            (DomainError::NoOrganization, StatusCode::FORBIDDEN, "NO_ORGANIZATION"),
            (DomainError::AccountDisabled, StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
            (
                DomainError::InsufficientRole { required: Role::Admin, actual: Role::Member },
                StatusCode::FORBIDDEN,
                "INSUFFICIENT_ROLE",
            ),
            (DomainError::PlatformAdminRequired, StatusCode::FORBIDDEN, "PLATFORM_ADMIN_REQUIRED"),
            (
                DomainError::InvalidStatusTransition {
                    from: AssessmentStatus::Draft,
                    to: AssessmentStatus::Completed,
                },
                StatusCode::CONFLICT,
                "INVALID_STATUS_TRANSITION",
            ),
            (DomainError::ValidationError("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (DomainError::DatabaseError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (domain, status, code) in cases {
            let api: ApiError = domain.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_internal_error_keeps_raw_message() {
        let api: ApiError = DomainError::DatabaseError("connection reset".into()).into();
        assert!(api.to_string().contains("connection reset"));
    }

    #[test]
    fn test_feature_disabled_is_not_found() {
        let api = ApiError::FeatureDisabled("reports");
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
        assert_eq!(api.code(), "FEATURE_DISABLED");
    }
}
