//! Time and calendar-date helpers
//!
//! Timestamps are stored as epoch seconds (i64). Calendar dates (run dates,
//! challenge windows) are stored as ISO `YYYY-MM-DD` strings and handled as
//! `NaiveDate` - streak arithmetic is whole-day and timezone-free.

use chrono::{DateTime, NaiveDate, Utc};

/// Today's calendar date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Convert epoch seconds to DateTime<Utc>, clamping invalid values to epoch
pub fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(|| {
        tracing::warn!(ts, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// Parse an ISO `YYYY-MM-DD` date string
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Format a date as ISO `YYYY-MM-DD`
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_ts_to_datetime_epoch() {
        let dt = ts_to_datetime(0);
        assert_eq!(dt.year(), 1970);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_ts_to_datetime_known_value() {
        // 2024-01-01 00:00:00 UTC
        let dt = ts_to_datetime(1704067200);
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_parse_date_roundtrip() {
        let d = parse_date("2025-03-09").unwrap();
        assert_eq!(format_date(d), "2025-03-09");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_date("").is_none());
    }
}
