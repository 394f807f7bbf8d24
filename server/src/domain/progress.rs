//! Challenge progress engine
//!
//! Pure calendar-day arithmetic over a progress row: distance accumulation,
//! day counting, streak computation and completion. The repository applies
//! the result transactionally; nothing here touches storage.
//!
//! Streak rules:
//! - a run the day after `last_streak_date` extends the streak
//! - a second run on the same day leaves it unchanged
//! - anything else (gap, or first run) resets it to 1
//!
//! Completion is monotonic: once a row is complete it never reverts.

use chrono::NaiveDate;

use crate::data::types::{ChallengeKind, ChallengeRow, ProgressRow};
use crate::utils::time::parse_date;

/// The new counter values after applying one qualifying run
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDelta {
    pub days_completed: i64,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_run_date: NaiveDate,
    pub last_streak_date: NaiveDate,
    pub is_complete: bool,
}

/// Apply one qualifying run to a progress row.
pub fn apply_run(
    progress: &ProgressRow,
    challenge: &ChallengeRow,
    run_date: NaiveDate,
    distance_km: f64,
) -> ProgressDelta {
    let last_run = progress.last_run_date.as_deref().and_then(parse_date);
    let last_streak = progress.last_streak_date.as_deref().and_then(parse_date);

    let total_distance_km = progress.total_distance_km + distance_km;

    // A calendar day is counted once no matter how many runs land on it
    let days_completed = if last_run == Some(run_date) {
        progress.days_completed
    } else {
        progress.days_completed + 1
    };

    let current_streak = match last_streak {
        Some(prev) if prev.succ_opt() == Some(run_date) => progress.current_streak + 1,
        Some(prev) if prev == run_date => progress.current_streak,
        _ => 1,
    };
    let longest_streak = progress.longest_streak.max(current_streak);

    let candidate = ProgressDelta {
        days_completed,
        total_distance_km,
        current_streak,
        longest_streak,
        last_run_date: run_date,
        last_streak_date: run_date,
        is_complete: false,
    };

    ProgressDelta {
        // Monotonic: prior completion sticks
        is_complete: progress.is_complete || completion_met(&candidate, challenge),
        ..candidate
    }
}

/// Whether the counters meet the challenge's completion criterion.
///
/// With `span_days` = days between start and end date:
/// - total_distance: total ≥ required_km_per_day × span_days
/// - daily_distance: days_completed ≥ span_days
/// - run_streak:     current_streak ≥ span_days
/// - custom:         never auto-completes
pub fn completion_met(delta: &ProgressDelta, challenge: &ChallengeRow) -> bool {
    let Some(kind) = ChallengeKind::parse(&challenge.kind) else {
        return false;
    };
    let Some(span_days) = challenge_span_days(challenge) else {
        return false;
    };

    match kind {
        ChallengeKind::TotalDistance => challenge
            .required_km_per_day
            .is_some_and(|per_day| delta.total_distance_km >= per_day * span_days as f64),
        ChallengeKind::DailyDistance => delta.days_completed >= span_days,
        ChallengeKind::RunStreak => delta.current_streak >= span_days,
        ChallengeKind::Custom => false,
    }
}

/// Whole days between the challenge's start and end dates
fn challenge_span_days(challenge: &ChallengeRow) -> Option<i64> {
    let start = parse_date(&challenge.start_date)?;
    let end = parse_date(&challenge.end_date)?;
    let days = (end - start).num_days();
    (days > 0).then_some(days)
}

/// Whether a run date falls inside the challenge window (inclusive)
pub fn in_window(challenge: &ChallengeRow, run_date: NaiveDate) -> bool {
    match (parse_date(&challenge.start_date), parse_date(&challenge.end_date)) {
        (Some(start), Some(end)) => run_date >= start && run_date <= end,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(kind: &str, per_day: Option<f64>, start: &str, end: &str) -> ChallengeRow {
        ChallengeRow {
            id: "c1".into(),
            title: "Test".into(),
            description: None,
            kind: kind.into(),
            required_km_per_day: per_day,
            start_date: start.into(),
            end_date: end.into(),
            is_public: true,
            is_active: true,
            created_by: "u1".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn fresh_progress() -> ProgressRow {
        ProgressRow {
            id: "p1".into(),
            challenge_id: "c1".into(),
            user_id: "u1".into(),
            days_completed: 0,
            total_distance_km: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_run_date: None,
            last_streak_date: None,
            is_complete: false,
            joined_at: 0,
            updated_at: 0,
        }
    }

    fn with_delta(mut progress: ProgressRow, delta: &ProgressDelta) -> ProgressRow {
        progress.days_completed = delta.days_completed;
        progress.total_distance_km = delta.total_distance_km;
        progress.current_streak = delta.current_streak;
        progress.longest_streak = delta.longest_streak;
        progress.last_run_date = Some(delta.last_run_date.format("%Y-%m-%d").to_string());
        progress.last_streak_date = Some(delta.last_streak_date.format("%Y-%m-%d").to_string());
        progress.is_complete = delta.is_complete;
        progress
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_first_run_starts_streak() {
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-30");
        let delta = apply_run(&fresh_progress(), &challenge, date("2025-06-01"), 5.0);

        assert_eq!(delta.current_streak, 1);
        assert_eq!(delta.longest_streak, 1);
        assert_eq!(delta.days_completed, 1);
        assert_eq!(delta.total_distance_km, 5.0);
    }

    #[test]
    fn test_streak_trace_run_run_skip_run() {
        // Runs on day 1 and 2, skip day 3, run day 4.
        // Expected streak trace [1, 2, 1], longest 2.
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-30");
        let mut progress = fresh_progress();
        let mut trace = Vec::new();

        for day in ["2025-06-01", "2025-06-02", "2025-06-04"] {
            let delta = apply_run(&progress, &challenge, date(day), 5.0);
            trace.push(delta.current_streak);
            progress = with_delta(progress, &delta);
        }

        assert_eq!(trace, vec![1, 2, 1]);
        assert_eq!(progress.longest_streak, 2);
        assert_eq!(progress.days_completed, 3);
    }

    #[test]
    fn test_same_day_run_counts_once() {
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-30");
        let mut progress = fresh_progress();

        let delta = apply_run(&progress, &challenge, date("2025-06-01"), 5.0);
        progress = with_delta(progress, &delta);
        let delta = apply_run(&progress, &challenge, date("2025-06-01"), 3.0);

        // Distance accumulates; the day and streak do not
        assert_eq!(delta.total_distance_km, 8.0);
        assert_eq!(delta.days_completed, 1);
        assert_eq!(delta.current_streak, 1);
    }

    #[test]
    fn test_total_distance_completion() {
        // 10 day window at 2 km/day = 20 km required total
        let challenge = challenge("total_distance", Some(2.0), "2025-06-01", "2025-06-11");
        let mut progress = fresh_progress();

        let delta = apply_run(&progress, &challenge, date("2025-06-01"), 15.0);
        assert!(!delta.is_complete);
        progress = with_delta(progress, &delta);

        let delta = apply_run(&progress, &challenge, date("2025-06-02"), 5.0);
        assert!(delta.is_complete);
    }

    #[test]
    fn test_run_streak_completion() {
        // 3 day window: streak of 3 completes
        let challenge = challenge("run_streak", None, "2025-06-01", "2025-06-04");
        let mut progress = fresh_progress();

        for (day, expect) in [
            ("2025-06-01", false),
            ("2025-06-02", false),
            ("2025-06-03", true),
        ] {
            let delta = apply_run(&progress, &challenge, date(day), 5.0);
            assert_eq!(delta.is_complete, expect, "day {}", day);
            progress = with_delta(progress, &delta);
        }
    }

    #[test]
    fn test_daily_distance_completion() {
        // 2 day window: 2 distinct days complete it
        let challenge = challenge("daily_distance", Some(1.0), "2025-06-01", "2025-06-03");
        let mut progress = fresh_progress();

        let delta = apply_run(&progress, &challenge, date("2025-06-01"), 5.0);
        assert!(!delta.is_complete);
        progress = with_delta(progress, &delta);

        let delta = apply_run(&progress, &challenge, date("2025-06-02"), 5.0);
        assert!(delta.is_complete);
    }

    #[test]
    fn test_completion_is_monotonic() {
        // Once complete, a streak-breaking run cannot revert it
        let challenge = challenge("run_streak", None, "2025-06-01", "2025-06-03");
        let mut progress = fresh_progress();

        for day in ["2025-06-01", "2025-06-02"] {
            let delta = apply_run(&progress, &challenge, date(day), 5.0);
            progress = with_delta(progress, &delta);
        }
        assert!(progress.is_complete);

        // Gap resets the streak but completion sticks
        let delta = apply_run(&progress, &challenge, date("2025-06-05"), 5.0);
        assert_eq!(delta.current_streak, 1);
        assert!(delta.is_complete);
    }

    #[test]
    fn test_custom_never_auto_completes() {
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-02");
        let mut progress = fresh_progress();

        for day in ["2025-06-01", "2025-06-02"] {
            let delta = apply_run(&progress, &challenge, date(day), 100.0);
            assert!(!delta.is_complete);
            progress = with_delta(progress, &delta);
        }
    }

    #[test]
    fn test_in_window() {
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-10");
        assert!(in_window(&challenge, date("2025-06-01")));
        assert!(in_window(&challenge, date("2025-06-10")));
        assert!(!in_window(&challenge, date("2025-05-31")));
        assert!(!in_window(&challenge, date("2025-06-11")));
    }

    #[test]
    fn test_longest_streak_preserved_after_reset() {
        let challenge = challenge("custom", None, "2025-06-01", "2025-06-30");
        let mut progress = fresh_progress();

        for day in ["2025-06-01", "2025-06-02", "2025-06-03"] {
            let delta = apply_run(&progress, &challenge, date(day), 1.0);
            progress = with_delta(progress, &delta);
        }
        assert_eq!(progress.longest_streak, 3);

        let delta = apply_run(&progress, &challenge, date("2025-06-10"), 1.0);
        assert_eq!(delta.current_streak, 1);
        assert_eq!(delta.longest_streak, 3);
    }
}
