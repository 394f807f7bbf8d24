//! Attendance repository for SQLite operations
//!
//! One RSVP per (run, user), enforced by a UNIQUE constraint. Re-submitting
//! updates the row in place (and bumps updated_at) rather than duplicating.
//! Summary counts are always derived by aggregation, never stored.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{AttendanceRow, AttendanceStatus, AttendanceSummary};

type AttendanceTuple = (
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
    Option<i64>,
);

fn row_to_attendance(
    (id, run_id, user_id, status, notes, created_at, updated_at): AttendanceTuple,
) -> AttendanceRow {
    AttendanceRow {
        id,
        run_id,
        user_id,
        status,
        notes,
        created_at,
        updated_at,
    }
}

const ATTENDANCE_COLUMNS: &str = "id, run_id, user_id, status, notes, created_at, updated_at";

/// Set a user's RSVP for a run (idempotent upsert keyed on (run, user)).
///
/// The membership precondition is checked at the route layer; the storage
/// layer guarantees at most one row per pair even under concurrent
/// duplicate requests.
pub async fn set_attendance(
    pool: &SqlitePool,
    id: &str,
    run_id: &str,
    user_id: &str,
    status: AttendanceStatus,
    notes: Option<&str>,
) -> Result<AttendanceRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO attendance (id, run_id, user_id, status, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(run_id, user_id) DO UPDATE SET
            status = excluded.status,
            notes = excluded.notes,
            updated_at = excluded.created_at
        "#,
    )
    .bind(id)
    .bind(run_id)
    .bind(user_id)
    .bind(status.as_str())
    .bind(notes)
    .bind(now)
    .execute(pool)
    .await?;

    // Re-read: on conflict the surviving row keeps its original id/created_at
    get_for_user(pool, run_id, user_id)
        .await?
        .ok_or_else(|| SqliteError::Conflict("attendance row vanished after upsert".to_string()))
}

/// Get a user's RSVP for a run
pub async fn get_for_user(
    pool: &SqlitePool,
    run_id: &str,
    user_id: &str,
) -> Result<Option<AttendanceRow>, SqliteError> {
    let row = sqlx::query_as::<_, AttendanceTuple>(&format!(
        "SELECT {} FROM attendance WHERE run_id = ? AND user_id = ?",
        ATTENDANCE_COLUMNS
    ))
    .bind(run_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_attendance))
}

/// Get an attendance row by ID (for self-service deletion)
pub async fn get_attendance(
    pool: &SqlitePool,
    attendance_id: &str,
) -> Result<Option<AttendanceRow>, SqliteError> {
    let row = sqlx::query_as::<_, AttendanceTuple>(&format!(
        "SELECT {} FROM attendance WHERE id = ?",
        ATTENDANCE_COLUMNS
    ))
    .bind(attendance_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_attendance))
}

/// List all RSVPs for a run, earliest first
pub async fn list_for_run(
    pool: &SqlitePool,
    run_id: &str,
) -> Result<Vec<AttendanceRow>, SqliteError> {
    let rows = sqlx::query_as::<_, AttendanceTuple>(&format!(
        "SELECT {} FROM attendance WHERE run_id = ? ORDER BY created_at ASC",
        ATTENDANCE_COLUMNS
    ))
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_attendance).collect())
}

/// Summarize RSVPs for a run by status.
///
/// Pure aggregation over the rows; the three counts sum to the row count.
pub async fn summarize(pool: &SqlitePool, run_id: &str) -> Result<AttendanceSummary, SqliteError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM attendance WHERE run_id = ? GROUP BY status",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    let mut summary = AttendanceSummary::default();
    for (status, count) in rows {
        match AttendanceStatus::parse(&status) {
            Some(AttendanceStatus::Going) => summary.going = count as u64,
            Some(AttendanceStatus::Maybe) => summary.maybe = count as u64,
            Some(AttendanceStatus::NotGoing) => summary.not_going = count as u64,
            // CHECK constraint makes this unreachable
            None => tracing::warn!(run_id, status, "Unknown attendance status in store"),
        }
    }

    Ok(summary)
}

/// Delete an attendance row
pub async fn delete_attendance(
    pool: &SqlitePool,
    attendance_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{group, run, user};
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        for id in ["owner", "runner", "walker"] {
            user::create_user(pool, id, &format!("{}@example.com", id), None, "hash")
                .await
                .unwrap();
        }
        group::create_group(pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
        run::create_run(pool, "r1", "g1", "owner", "Tempo", None, None, None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_with_latest_status() {
        let pool = test_pool().await;
        seed(&pool).await;

        let first = set_attendance(&pool, "a1", "r1", "runner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        assert_eq!(first.status, "going");
        assert!(first.updated_at.is_none());

        let second = set_attendance(
            &pool,
            "a2",
            "r1",
            "runner",
            AttendanceStatus::Maybe,
            Some("might be late"),
        )
        .await
        .unwrap();

        // Same row: original id and created_at survive, status and notes move
        assert_eq!(second.id, "a1");
        assert_eq!(second.status, "maybe");
        assert_eq!(second.notes.as_deref(), Some("might be late"));
        assert!(second.updated_at.is_some());

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance WHERE run_id = 'r1' AND user_id = 'runner'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_resubmitting_same_status_bumps_updated_at() {
        let pool = test_pool().await;
        seed(&pool).await;

        set_attendance(&pool, "a1", "r1", "runner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        let again = set_attendance(&pool, "a2", "r1", "runner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        assert_eq!(again.status, "going");
        assert!(again.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_summary_counts_sum_to_row_count() {
        let pool = test_pool().await;
        seed(&pool).await;

        set_attendance(&pool, "a1", "r1", "owner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        set_attendance(&pool, "a2", "r1", "runner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        set_attendance(&pool, "a3", "r1", "walker", AttendanceStatus::NotGoing, None)
            .await
            .unwrap();

        let summary = summarize(&pool, "r1").await.unwrap();
        assert_eq!(summary.going, 2);
        assert_eq!(summary.maybe, 0);
        assert_eq!(summary.not_going, 1);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE run_id = 'r1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(summary.total(), rows as u64);
    }

    #[tokio::test]
    async fn test_summary_empty_run() {
        let pool = test_pool().await;
        seed(&pool).await;

        let summary = summarize(&pool, "r1").await.unwrap();
        assert_eq!(summary, AttendanceSummary::default());
    }

    #[tokio::test]
    async fn test_delete_attendance() {
        let pool = test_pool().await;
        seed(&pool).await;

        set_attendance(&pool, "a1", "r1", "runner", AttendanceStatus::Going, None)
            .await
            .unwrap();
        assert!(delete_attendance(&pool, "a1").await.unwrap());
        assert!(!delete_attendance(&pool, "a1").await.unwrap());
        assert!(get_for_user(&pool, "r1", "runner").await.unwrap().is_none());
    }
}
