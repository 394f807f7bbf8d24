//! Chat API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::MessageWithAuthor;
use crate::utils::time::ts_to_datetime;

/// Chat message DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageWithAuthor> for MessageDto {
    fn from(row: MessageWithAuthor) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            author_id: row.author_id,
            author_name: row.author_name,
            body: row.body,
            created_at: ts_to_datetime(row.created_at),
        }
    }
}

/// Request body for sending a message
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub body: String,
}

/// Query params for listing messages
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListMessagesQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
