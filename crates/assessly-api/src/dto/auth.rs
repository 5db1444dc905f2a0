use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EnsureProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Organization name must be between 2 and 100 characters"))]
    pub organization_name: Option<String>,

    #[validate(length(min = 1, max = 120, message = "Full name must be between 1 and 120 characters"))]
    pub full_name: Option<String>,
}
