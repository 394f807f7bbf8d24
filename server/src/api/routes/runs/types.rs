//! Scheduled run API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{
    AttendanceRow, AttendanceSummary, CommentWithAuthor, ScheduledRunRow,
};
use crate::utils::time::ts_to_datetime;

/// Scheduled run DTO with derived schedule fields.
///
/// `is_upcoming` and `days_remaining` are computed per response, never
/// persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunDto {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub pace: Option<String>,
    pub distance_km: Option<f64>,
    pub is_upcoming: bool,
    pub days_remaining: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RunDto {
    pub fn from_row(row: ScheduledRunRow, now: DateTime<Utc>) -> Self {
        let starts_at = row.starts_at.map(ts_to_datetime);
        let is_upcoming = starts_at.is_some_and(|t| t > now);
        let days_remaining = starts_at
            .filter(|t| *t > now)
            .map(|t| (t - now).num_days());

        Self {
            id: row.id,
            group_id: row.group_id,
            author_id: row.author_id,
            title: row.title,
            starts_at,
            location: row.location,
            pace: row.pace,
            distance_km: row.distance_km,
            is_upcoming,
            days_remaining,
            created_at: ts_to_datetime(row.created_at),
            updated_at: row.updated_at.map(ts_to_datetime),
        }
    }
}

impl From<ScheduledRunRow> for RunDto {
    fn from(row: ScheduledRunRow) -> Self {
        Self::from_row(row, Utc::now())
    }
}

/// Attendance DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceDto {
    pub id: String,
    pub run_id: String,
    pub user_id: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AttendanceRow> for AttendanceDto {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            user_id: row.user_id,
            status: row.status,
            notes: row.notes,
            created_at: ts_to_datetime(row.created_at),
            updated_at: row.updated_at.map(ts_to_datetime),
        }
    }
}

/// Attendance summary with individual RSVPs
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub going: u64,
    pub maybe: u64,
    pub not_going: u64,
    pub rsvps: Vec<AttendanceDto>,
}

impl AttendanceListResponse {
    pub fn new(summary: AttendanceSummary, rsvps: Vec<AttendanceDto>) -> Self {
        Self {
            going: summary.going,
            maybe: summary.maybe,
            not_going: summary.not_going,
            rsvps,
        }
    }
}

/// Comment DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentDto {
    pub id: String,
    pub run_id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentDto {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.comment.id,
            run_id: row.comment.run_id,
            author_id: row.comment.author_id,
            author_name: row.author_name,
            body: row.comment.body,
            created_at: ts_to_datetime(row.comment.created_at),
        }
    }
}

/// Request body for creating a scheduled run
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRunRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub starts_at: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 50, message = "Pace must be at most 50 characters"))]
    pub pace: Option<String>,

    #[validate(range(min = 0.1, max = 1000.0, message = "Distance must be 0.1-1000 km"))]
    pub distance_km: Option<f64>,
}

/// Request body for updating a scheduled run
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRunRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 50, message = "Pace must be at most 50 characters"))]
    pub pace: Option<String>,

    #[validate(range(min = 0.1, max = 1000.0, message = "Distance must be 0.1-1000 km"))]
    pub distance_km: Option<f64>,
}

/// Request body for setting attendance. The status string is parsed into
/// the closed enum; unknown values are rejected loudly.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetAttendanceRequest {
    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: String,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Request body for posting a comment
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub body: String,
}

/// Query params for listing runs
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListRunsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_row(starts_at: Option<i64>) -> ScheduledRunRow {
        ScheduledRunRow {
            id: "r1".into(),
            group_id: "g1".into(),
            author_id: "u1".into(),
            title: "Tempo".into(),
            starts_at,
            location: None,
            pace: None,
            distance_km: None,
            created_at: 0,
            updated_at: None,
        }
    }

    #[test]
    fn test_derived_upcoming_fields() {
        let now = ts_to_datetime(1_750_000_000);

        // Two days in the future
        let dto = RunDto::from_row(run_row(Some(1_750_000_000 + 2 * 86_400)), now);
        assert!(dto.is_upcoming);
        assert_eq!(dto.days_remaining, Some(2));

        // In the past
        let dto = RunDto::from_row(run_row(Some(1_750_000_000 - 86_400)), now);
        assert!(!dto.is_upcoming);
        assert_eq!(dto.days_remaining, None);

        // Undated
        let dto = RunDto::from_row(run_row(None), now);
        assert!(!dto.is_upcoming);
        assert_eq!(dto.days_remaining, None);
    }
}
