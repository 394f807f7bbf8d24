//! User API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::UserRow;
use crate::utils::time::ts_to_datetime;

/// User DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            created_at: ts_to_datetime(row.created_at),
        }
    }
}

/// Group summary in the profile response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserGroupDto {
    pub id: String,
    pub name: String,
    pub is_owner: bool,
}

/// Profile response: the user plus the groups they belong to
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserDto,
    pub groups: Vec<UserGroupDto>,
}

/// Request body for updating the current user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 500, message = "Avatar URL must be at most 500 characters"))]
    pub avatar_url: Option<String>,
}

/// Request body for changing the password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password cannot be empty"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}
