//! Row types shared between repositories and the API layer
//!
//! Timestamps are epoch seconds. Calendar dates are ISO `YYYY-MM-DD`
//! strings (parsed to `NaiveDate` at the domain boundary).

use serde::{Deserialize, Serialize};

// ============================================================================
// User types
// ============================================================================

/// User row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// NULL only for the seeded local user (--no-auth mode)
    pub password_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Group types
// ============================================================================

/// Group row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Group with its derived member count (for list endpoints)
///
/// The count is always computed from membership rows plus the implicit
/// owner - never stored.
#[derive(Debug, Clone)]
pub struct GroupWithMemberCount {
    pub group: GroupRow,
    pub member_count: u64,
}

// ============================================================================
// Membership types
// ============================================================================

/// Membership row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRow {
    pub group_id: String,
    pub user_id: String,
    pub created_at: i64,
}

/// Member with user info (for list_members)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithUser {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// True for the group owner (who has no membership row)
    pub is_owner: bool,
    pub joined_at: i64,
}

// ============================================================================
// Scheduled run types
// ============================================================================

/// Scheduled run row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRunRow {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub title: String,
    /// Epoch seconds; None for runs without a fixed time yet
    pub starts_at: Option<i64>,
    pub location: Option<String>,
    pub pace: Option<String>,
    pub distance_km: Option<f64>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

// ============================================================================
// Attendance types
// ============================================================================

/// Attendance row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub id: String,
    pub run_id: String,
    pub user_id: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Derived attendance counts for one run
///
/// Invariant: going + maybe + not_going equals the attendance row count
/// for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub going: u64,
    pub maybe: u64,
    pub not_going: u64,
}

impl AttendanceSummary {
    pub fn total(&self) -> u64 {
        self.going + self.maybe + self.not_going
    }
}

// ============================================================================
// Comment types
// ============================================================================

/// Run comment row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCommentRow {
    pub id: String,
    pub run_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: i64,
}

/// Comment joined with author info (for list endpoints)
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: RunCommentRow,
    pub author_name: Option<String>,
}

// ============================================================================
// Shoe and activity types
// ============================================================================

/// Shoe row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoeRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Distance already on the shoe when it was added
    pub base_distance_km: f64,
    pub retired: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shoe with derived total mileage (base + sum of logged runs)
#[derive(Debug, Clone)]
pub struct ShoeWithMileage {
    pub shoe: ShoeRow,
    pub total_distance_km: f64,
}

/// Logged individual run row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: String,
    pub user_id: String,
    pub shoe_id: Option<String>,
    pub title: Option<String>,
    pub distance_km: f64,
    pub duration_secs: Option<i64>,
    /// ISO `YYYY-MM-DD`
    pub run_date: String,
    pub notes: Option<String>,
    pub created_at: i64,
}

// ============================================================================
// Challenge types
// ============================================================================

/// Challenge row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub required_km_per_day: Option<f64>,
    /// ISO `YYYY-MM-DD`
    pub start_date: String,
    /// ISO `YYYY-MM-DD`, strictly after start_date
    pub end_date: String,
    pub is_public: bool,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Challenge progress row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRow {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    pub days_completed: i64,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_run_date: Option<String>,
    pub last_streak_date: Option<String>,
    pub is_complete: bool,
    pub joined_at: i64,
    pub updated_at: i64,
}

/// Leaderboard entry (progress joined with user info)
#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: Option<String>,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub days_completed: i64,
    pub is_complete: bool,
    pub joined_at: i64,
}

// ============================================================================
// Chat types
// ============================================================================

/// Chat message joined with author info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageWithAuthor {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_summary_total() {
        let summary = AttendanceSummary {
            going: 3,
            maybe: 2,
            not_going: 1,
        };
        assert_eq!(summary.total(), 6);
        assert_eq!(AttendanceSummary::default().total(), 0);
    }
}
