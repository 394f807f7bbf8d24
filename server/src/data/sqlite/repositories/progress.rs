//! Challenge progress repository for SQLite operations
//!
//! Exactly one progress row per (challenge, user) - a UNIQUE constraint,
//! surfaced to callers as AlreadyJoined instead of check-then-insert.
//! `record_run` reads and writes the row inside one transaction so
//! concurrent activity logging cannot lose an update.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ChallengeRow, LeaderboardEntry, ProgressRow};
use crate::domain::progress::apply_run;
use crate::utils::time::format_date;

/// Outcome of a join attempt
#[derive(Debug, Clone)]
pub enum ProgressJoinResult {
    Joined(ProgressRow),
    AlreadyJoined,
}

type ProgressTuple = (
    String,
    String,
    String,
    i64,
    f64,
    i64,
    i64,
    Option<String>,
    Option<String>,
    i64,
    i64,
    i64,
);

fn row_to_progress(
    (id, challenge_id, user_id, days_completed, total_distance_km, current_streak, longest_streak, last_run_date, last_streak_date, is_complete, joined_at, updated_at): ProgressTuple,
) -> ProgressRow {
    ProgressRow {
        id,
        challenge_id,
        user_id,
        days_completed,
        total_distance_km,
        current_streak,
        longest_streak,
        last_run_date,
        last_streak_date,
        is_complete: is_complete != 0,
        joined_at,
        updated_at,
    }
}

const PROGRESS_COLUMNS: &str = "id, challenge_id, user_id, days_completed, total_distance_km, current_streak, longest_streak, last_run_date, last_streak_date, is_complete, joined_at, updated_at";

/// Join a challenge with zeroed counters
pub async fn join(
    pool: &SqlitePool,
    id: &str,
    challenge_id: &str,
    user_id: &str,
) -> Result<ProgressJoinResult, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO challenge_progress (id, challenge_id, user_id, joined_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(challenge_id)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(ProgressJoinResult::Joined(ProgressRow {
            id: id.to_string(),
            challenge_id: challenge_id.to_string(),
            user_id: user_id.to_string(),
            days_completed: 0,
            total_distance_km: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_run_date: None,
            last_streak_date: None,
            is_complete: false,
            joined_at: now,
            updated_at: now,
        })),
        Err(e) => {
            let err = SqliteError::from(e);
            if err.is_unique_violation() {
                Ok(ProgressJoinResult::AlreadyJoined)
            } else {
                Err(err)
            }
        }
    }
}

/// Get a user's progress row for a challenge
pub async fn get_progress(
    pool: &SqlitePool,
    challenge_id: &str,
    user_id: &str,
) -> Result<Option<ProgressRow>, SqliteError> {
    let row = sqlx::query_as::<_, ProgressTuple>(&format!(
        "SELECT {} FROM challenge_progress WHERE challenge_id = ? AND user_id = ?",
        PROGRESS_COLUMNS
    ))
    .bind(challenge_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_progress))
}

/// Apply one qualifying run to a user's progress, transactionally.
///
/// Returns None when the user has not joined the challenge. The read,
/// streak computation and write happen in a single transaction.
pub async fn record_run(
    pool: &SqlitePool,
    challenge: &ChallengeRow,
    user_id: &str,
    run_date: NaiveDate,
    distance_km: f64,
) -> Result<Option<ProgressRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ProgressTuple>(&format!(
        "SELECT {} FROM challenge_progress WHERE challenge_id = ? AND user_id = ?",
        PROGRESS_COLUMNS
    ))
    .bind(&challenge.id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(progress) = row.map(row_to_progress) else {
        return Ok(None);
    };

    let delta = apply_run(&progress, challenge, run_date, distance_km);

    sqlx::query(
        r#"
        UPDATE challenge_progress
        SET days_completed = ?,
            total_distance_km = ?,
            current_streak = ?,
            longest_streak = ?,
            last_run_date = ?,
            last_streak_date = ?,
            is_complete = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(delta.days_completed)
    .bind(delta.total_distance_km)
    .bind(delta.current_streak)
    .bind(delta.longest_streak)
    .bind(format_date(delta.last_run_date))
    .bind(format_date(delta.last_streak_date))
    .bind(delta.is_complete as i64)
    .bind(now)
    .bind(&progress.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(ProgressRow {
        days_completed: delta.days_completed,
        total_distance_km: delta.total_distance_km,
        current_streak: delta.current_streak,
        longest_streak: delta.longest_streak,
        last_run_date: Some(format_date(delta.last_run_date)),
        last_streak_date: Some(format_date(delta.last_streak_date)),
        is_complete: delta.is_complete,
        updated_at: now,
        ..progress
    }))
}

/// Leaderboard: total distance desc, streak desc, then join time asc so the
/// ordering is fully deterministic for equal values.
pub async fn leaderboard(
    pool: &SqlitePool,
    challenge_id: &str,
    top_n: u32,
) -> Result<Vec<LeaderboardEntry>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, Option<String>, f64, i64, i64, i64, i64)>(
        r#"
        SELECT cp.user_id, u.display_name, cp.total_distance_km, cp.current_streak,
               cp.days_completed, cp.is_complete, cp.joined_at
        FROM challenge_progress cp
        JOIN users u ON cp.user_id = u.id
        WHERE cp.challenge_id = ?
        ORDER BY cp.total_distance_km DESC, cp.current_streak DESC, cp.joined_at ASC
        LIMIT ?
        "#,
    )
    .bind(challenge_id)
    .bind(top_n)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(user_id, display_name, total_distance_km, current_streak, days_completed, is_complete, joined_at)| {
                LeaderboardEntry {
                    user_id,
                    display_name,
                    total_distance_km,
                    current_streak,
                    days_completed,
                    is_complete: is_complete != 0,
                    joined_at,
                }
            },
        )
        .collect())
}

/// Leave a challenge (user-initiated removal of their own row only)
pub async fn leave(
    pool: &SqlitePool,
    challenge_id: &str,
    user_id: &str,
) -> Result<bool, SqliteError> {
    let result =
        sqlx::query("DELETE FROM challenge_progress WHERE challenge_id = ? AND user_id = ?")
            .bind(challenge_id)
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{challenge, user};
    use crate::data::sqlite::test_pool;
    use crate::utils::time::parse_date;

    async fn seed(pool: &SqlitePool) -> ChallengeRow {
        for id in ["creator", "ada", "bob", "cleo"] {
            user::create_user(pool, id, &format!("{}@example.com", id), None, "hash")
                .await
                .unwrap();
        }
        challenge::create_challenge(
            pool,
            "c1",
            "June miles",
            None,
            "custom",
            None,
            "2025-06-01",
            "2025-07-01",
            true,
            "creator",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_join_twice_keeps_one_row() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert!(matches!(
            join(&pool, "p1", "c1", "ada").await.unwrap(),
            ProgressJoinResult::Joined(_)
        ));
        assert!(matches!(
            join(&pool, "p2", "c1", "ada").await.unwrap(),
            ProgressJoinResult::AlreadyJoined
        ));

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM challenge_progress WHERE challenge_id = 'c1' AND user_id = 'ada'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_record_run_requires_join() {
        let pool = test_pool().await;
        let ch = seed(&pool).await;

        let result = record_run(&pool, &ch, "ada", parse_date("2025-06-01").unwrap(), 5.0)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_record_run_streak_trace() {
        let pool = test_pool().await;
        let ch = seed(&pool).await;
        join(&pool, "p1", "c1", "ada").await.unwrap();

        let mut trace = Vec::new();
        for day in ["2025-06-01", "2025-06-02", "2025-06-04"] {
            let progress = record_run(&pool, &ch, "ada", parse_date(day).unwrap(), 5.0)
                .await
                .unwrap()
                .unwrap();
            trace.push(progress.current_streak);
        }

        assert_eq!(trace, vec![1, 2, 1]);

        let final_row = get_progress(&pool, "c1", "ada").await.unwrap().unwrap();
        assert_eq!(final_row.longest_streak, 2);
        assert_eq!(final_row.days_completed, 3);
        assert_eq!(final_row.total_distance_km, 15.0);
        assert_eq!(final_row.last_run_date.as_deref(), Some("2025-06-04"));
    }

    #[tokio::test]
    async fn test_leaderboard_ordering_and_tiebreak() {
        let pool = test_pool().await;
        let ch = seed(&pool).await;

        // ada: 10 km, streak 3. bob: 10 km, streak 5. cleo: 5 km, streak 1.
        // Expected order: bob, ada, cleo.
        join(&pool, "p1", "c1", "ada").await.unwrap();
        join(&pool, "p2", "c1", "bob").await.unwrap();
        join(&pool, "p3", "c1", "cleo").await.unwrap();

        let runs: &[(&str, &str, f64)] = &[
            ("ada", "2025-06-03", 2.5),
            ("ada", "2025-06-04", 2.5),
            ("ada", "2025-06-05", 5.0),
            ("bob", "2025-06-01", 2.0),
            ("bob", "2025-06-02", 2.0),
            ("bob", "2025-06-03", 2.0),
            ("bob", "2025-06-04", 2.0),
            ("bob", "2025-06-05", 2.0),
            ("cleo", "2025-06-05", 5.0),
        ];
        for (user, day, km) in runs {
            record_run(&pool, &ch, user, parse_date(day).unwrap(), *km)
                .await
                .unwrap();
        }

        let entries = leaderboard(&pool, "c1", 10).await.unwrap();
        let order: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["bob", "ada", "cleo"]);
        assert_eq!(entries[0].current_streak, 5);

        let top_two = leaderboard(&pool, "c1", 2).await.unwrap();
        assert_eq!(top_two.len(), 2);
    }

    #[tokio::test]
    async fn test_leaderboard_equal_rows_tiebreak_on_join_time() {
        let pool = test_pool().await;
        let ch = seed(&pool).await;

        join(&pool, "p1", "c1", "ada").await.unwrap();
        // Force distinct join times
        sqlx::query("UPDATE challenge_progress SET joined_at = joined_at + 10 WHERE user_id = 'ada'")
            .execute(&pool)
            .await
            .unwrap();
        join(&pool, "p2", "c1", "bob").await.unwrap();
        sqlx::query("UPDATE challenge_progress SET joined_at = joined_at - 10 WHERE user_id = 'bob'")
            .execute(&pool)
            .await
            .unwrap();

        // Identical totals and streaks
        for user in ["ada", "bob"] {
            record_run(&pool, &ch, user, parse_date("2025-06-01").unwrap(), 5.0)
                .await
                .unwrap();
        }

        let entries = leaderboard(&pool, "c1", 10).await.unwrap();
        // bob joined earlier, so bob wins the tiebreak
        assert_eq!(entries[0].user_id, "bob");
        assert_eq!(entries[1].user_id, "ada");
    }

    #[tokio::test]
    async fn test_leave_removes_own_row_only() {
        let pool = test_pool().await;
        seed(&pool).await;

        join(&pool, "p1", "c1", "ada").await.unwrap();
        join(&pool, "p2", "c1", "bob").await.unwrap();

        assert!(leave(&pool, "c1", "ada").await.unwrap());
        assert!(!leave(&pool, "c1", "ada").await.unwrap());
        assert!(get_progress(&pool, "c1", "bob").await.unwrap().is_some());
    }
}
