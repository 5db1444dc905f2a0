//! Domain errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{AssessmentStatus, Role};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Assessment not found: {0}")]
    AssessmentNotFound(Uuid),

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("A profile is required; call /api/auth/ensure-profile first")]
    ProfileRequired,

    #[error("Profile is not a member of any organization")]
    NoOrganization,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Requires role {required} or higher (current role: {actual})")]
    InsufficientRole { required: Role, actual: Role },

    #[error("Platform administrator access required")]
    PlatformAdminRequired,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Organization slug already exists: {0}")]
    OrganizationSlugAlreadyExists(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AssessmentStatus,
        to: AssessmentStatus,
    },

    #[error("Report {0} is already being generated")]
    ReportAlreadyGenerating(Uuid),

    #[error("Report generation failed: {0}")]
    ReportGenerationFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
