use serde::Deserialize;
use validator::Validate;

use assessly_core::services::CreateUserInput;
use assessly_core::{ProfilePatch, Role, UserFilter};
use assessly_shared::Pagination;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserListQuery {
    #[validate(range(min = 1, message = "Page starts at 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(max = 100, message = "Search term too long"))]
    pub search: Option<String>,
}

impl UserListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> UserFilter {
        UserFilter {
            role: self.role,
            is_active: self.is_active,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 120, message = "Full name must be between 1 and 120 characters"))]
    pub full_name: Option<String>,

    #[serde(default)]
    pub role: Role,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        CreateUserInput {
            email: req.email,
            full_name: req.full_name,
            role: req.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 120, message = "Full name must be at most 120 characters"))]
    pub full_name: Option<String>,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,

    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for ProfilePatch {
    fn from(req: UpdateUserRequest) -> Self {
        ProfilePatch {
            full_name: req.full_name,
            avatar_url: req.avatar_url,
            role: req.role,
            is_active: req.is_active,
        }
    }
}
