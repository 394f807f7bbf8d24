//! Activity (run log) API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::ActivityRow;
use crate::utils::time::ts_to_datetime;

/// Logged run DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityDto {
    pub id: String,
    pub user_id: String,
    pub shoe_id: Option<String>,
    pub title: Option<String>,
    pub distance_km: f64,
    pub duration_secs: Option<i64>,
    pub run_date: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityDto {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            shoe_id: row.shoe_id,
            title: row.title,
            distance_km: row.distance_km,
            duration_secs: row.duration_secs,
            run_date: row.run_date,
            notes: row.notes,
            created_at: ts_to_datetime(row.created_at),
        }
    }
}

/// Request body for logging a run
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 0.01, max = 1000.0, message = "Distance must be 0.01-1000 km"))]
    pub distance_km: f64,

    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub duration_secs: Option<i64>,

    /// Calendar date of the run
    pub run_date: NaiveDate,

    pub shoe_id: Option<String>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Response for logging a run: the activity plus the challenge progress
/// rows it advanced
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateActivityResponse {
    pub activity: ActivityDto,
    /// IDs of challenges whose progress this run advanced
    pub challenges_advanced: Vec<String>,
}

/// Query params for listing activities
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListActivitiesQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
