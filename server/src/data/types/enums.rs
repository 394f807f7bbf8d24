//! Closed domain enums
//!
//! Values cross the wire as strings and are parsed leniently
//! (case-insensitive) but fail loudly on unrecognized input - callers map
//! a failed parse to a 400, never to a silent default.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// RSVP status for a scheduled group run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Going,
    Maybe,
    NotGoing,
}

impl AttendanceStatus {
    /// Parse from string representation (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "going" => Some(Self::Going),
            "maybe" => Some(Self::Maybe),
            "not_going" | "notgoing" => Some(Self::NotGoing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Maybe => "maybe",
            Self::NotGoing => "not_going",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Challenge goal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Hit a required distance every day of the window
    DailyDistance,
    /// Accumulate a total distance over the window
    TotalDistance,
    /// Run on consecutive days
    RunStreak,
    /// Free-form challenge, never auto-completes
    Custom,
}

impl ChallengeKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily_distance" => Some(Self::DailyDistance),
            "total_distance" => Some(Self::TotalDistance),
            "run_streak" => Some(Self::RunStreak),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyDistance => "daily_distance",
            Self::TotalDistance => "total_distance",
            Self::RunStreak => "run_streak",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type tag for uploaded images (selects the storage subdirectory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Avatar,
    Group,
}

impl UploadKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "avatar" => Some(Self::Avatar),
            "group" => Some(Self::Group),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Group => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_status_parse() {
        assert_eq!(AttendanceStatus::parse("going"), Some(AttendanceStatus::Going));
        assert_eq!(AttendanceStatus::parse("Going"), Some(AttendanceStatus::Going));
        assert_eq!(AttendanceStatus::parse("MAYBE"), Some(AttendanceStatus::Maybe));
        assert_eq!(
            AttendanceStatus::parse("not_going"),
            Some(AttendanceStatus::NotGoing)
        );
        assert_eq!(
            AttendanceStatus::parse("NotGoing"),
            Some(AttendanceStatus::NotGoing)
        );
        assert_eq!(AttendanceStatus::parse("attending"), None);
        assert_eq!(AttendanceStatus::parse(""), None);
    }

    #[test]
    fn test_attendance_status_roundtrip() {
        for status in [
            AttendanceStatus::Going,
            AttendanceStatus::Maybe,
            AttendanceStatus::NotGoing,
        ] {
            assert_eq!(AttendanceStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_challenge_kind_parse() {
        assert_eq!(
            ChallengeKind::parse("total_distance"),
            Some(ChallengeKind::TotalDistance)
        );
        assert_eq!(
            ChallengeKind::parse("RUN_STREAK"),
            Some(ChallengeKind::RunStreak)
        );
        assert_eq!(ChallengeKind::parse("custom"), Some(ChallengeKind::Custom));
        assert_eq!(ChallengeKind::parse("marathon"), None);
    }

    #[test]
    fn test_challenge_kind_display() {
        assert_eq!(ChallengeKind::DailyDistance.to_string(), "daily_distance");
        assert_eq!(ChallengeKind::Custom.to_string(), "custom");
    }

    #[test]
    fn test_upload_kind_parse() {
        assert_eq!(UploadKind::parse("avatar"), Some(UploadKind::Avatar));
        assert_eq!(UploadKind::parse("group"), Some(UploadKind::Group));
        assert_eq!(UploadKind::parse("banner"), None);
    }
}
