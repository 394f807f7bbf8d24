//! Challenge API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::core::constants::{DEFAULT_LEADERBOARD_TOP_N, MAX_LEADERBOARD_TOP_N};
use crate::data::types::{ChallengeRow, LeaderboardEntry, ProgressRow};
use crate::utils::time::ts_to_datetime;

/// Challenge DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub required_km_per_day: Option<f64>,
    pub start_date: String,
    pub end_date: String,
    pub is_public: bool,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChallengeRow> for ChallengeDto {
    fn from(row: ChallengeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            kind: row.kind,
            required_km_per_day: row.required_km_per_day,
            start_date: row.start_date,
            end_date: row.end_date,
            is_public: row.is_public,
            is_active: row.is_active,
            created_by: row.created_by,
            created_at: ts_to_datetime(row.created_at),
            updated_at: ts_to_datetime(row.updated_at),
        }
    }
}

/// Progress DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressDto {
    pub challenge_id: String,
    pub user_id: String,
    pub days_completed: i64,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_run_date: Option<String>,
    pub is_complete: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgressRow> for ProgressDto {
    fn from(row: ProgressRow) -> Self {
        Self {
            challenge_id: row.challenge_id,
            user_id: row.user_id,
            days_completed: row.days_completed,
            total_distance_km: row.total_distance_km,
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_run_date: row.last_run_date,
            is_complete: row.is_complete,
            joined_at: ts_to_datetime(row.joined_at),
            updated_at: ts_to_datetime(row.updated_at),
        }
    }
}

/// Leaderboard entry DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    pub rank: u32,
    pub user_id: String,
    pub display_name: Option<String>,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub days_completed: i64,
    pub is_complete: bool,
}

impl LeaderboardEntryDto {
    pub fn from_entry(rank: u32, entry: LeaderboardEntry) -> Self {
        Self {
            rank,
            user_id: entry.user_id,
            display_name: entry.display_name,
            total_distance_km: entry.total_distance_km,
            current_streak: entry.current_streak,
            days_completed: entry.days_completed,
            is_complete: entry.is_complete,
        }
    }
}

/// Request body for creating a challenge
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChallengeRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// One of: daily_distance, total_distance, run_streak, custom
    #[validate(length(min = 1, message = "Kind cannot be empty"))]
    pub kind: String,

    #[validate(range(min = 0.01, max = 1000.0, message = "Required km/day must be 0.01-1000"))]
    pub required_km_per_day: Option<f64>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

/// Request body for updating a challenge
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateChallengeRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub is_public: Option<bool>,
    pub is_active: Option<bool>,
}

/// Query params for listing challenges
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListChallengesQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}

/// Query params for the leaderboard
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LeaderboardQuery {
    #[serde(default = "default_top_n")]
    #[validate(custom(function = "validate_top_n"))]
    pub top: u32,
}

fn default_top_n() -> u32 {
    DEFAULT_LEADERBOARD_TOP_N
}

fn validate_top_n(top: u32) -> Result<(), validator::ValidationError> {
    if top == 0 || top > MAX_LEADERBOARD_TOP_N {
        return Err(validator::ValidationError::new("top_range").with_message(
            format!("top must be between 1 and {}", MAX_LEADERBOARD_TOP_N).into(),
        ));
    }
    Ok(())
}
