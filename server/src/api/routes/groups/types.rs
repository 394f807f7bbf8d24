//! Group API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{GroupRow, GroupWithMemberCount, MemberWithUser};
use crate::utils::time::ts_to_datetime;

/// Group DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupRow> for GroupDto {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            avatar_url: row.avatar_url,
            owner_id: row.owner_id,
            created_at: ts_to_datetime(row.created_at),
            updated_at: ts_to_datetime(row.updated_at),
        }
    }
}

/// Group with member count DTO (member count is derived, never stored)
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupSummaryDto {
    #[serde(flatten)]
    pub group: GroupDto,
    pub member_count: u64,
}

impl From<GroupWithMemberCount> for GroupSummaryDto {
    fn from(row: GroupWithMemberCount) -> Self {
        Self {
            group: GroupDto::from(row.group),
            member_count: row.member_count,
        }
    }
}

/// Member DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberDto {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_owner: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberWithUser> for MemberDto {
    fn from(row: MemberWithUser) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            is_owner: row.is_owner,
            joined_at: ts_to_datetime(row.joined_at),
        }
    }
}

/// Request body for creating a group
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

/// Request body for updating a group
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 500, message = "Avatar URL must be at most 500 characters"))]
    pub avatar_url: Option<String>,
}

/// Query params for listing groups
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListGroupsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}

/// Query params for listing members
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListMembersQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
