//! Scheduled run repository for SQLite operations
//!
//! Authorization is asymmetric by design: only the group owner creates a
//! run, but after creation only the run's author may edit or delete it.
//! Both rules are enforced at the route layer; this module stores and
//! retrieves the rows the checks need.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ScheduledRunRow;

type RunTuple = (
    String,
    String,
    String,
    String,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<f64>,
    i64,
    Option<i64>,
);

fn row_to_run(
    (id, group_id, author_id, title, starts_at, location, pace, distance_km, created_at, updated_at): RunTuple,
) -> ScheduledRunRow {
    ScheduledRunRow {
        id,
        group_id,
        author_id,
        title,
        starts_at,
        location,
        pace,
        distance_km,
        created_at,
        updated_at,
    }
}

const RUN_COLUMNS: &str =
    "id, group_id, author_id, title, starts_at, location, pace, distance_km, created_at, updated_at";

/// Create a scheduled run
#[allow(clippy::too_many_arguments)]
pub async fn create_run(
    pool: &SqlitePool,
    id: &str,
    group_id: &str,
    author_id: &str,
    title: &str,
    starts_at: Option<i64>,
    location: Option<&str>,
    pace: Option<&str>,
    distance_km: Option<f64>,
) -> Result<ScheduledRunRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO scheduled_runs (id, group_id, author_id, title, starts_at, location, pace, distance_km, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(group_id)
    .bind(author_id)
    .bind(title)
    .bind(starts_at)
    .bind(location)
    .bind(pace)
    .bind(distance_km)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ScheduledRunRow {
        id: id.to_string(),
        group_id: group_id.to_string(),
        author_id: author_id.to_string(),
        title: title.to_string(),
        starts_at,
        location: location.map(String::from),
        pace: pace.map(String::from),
        distance_km,
        created_at: now,
        updated_at: None,
    })
}

/// Get a scheduled run by ID
pub async fn get_run(
    pool: &SqlitePool,
    run_id: &str,
) -> Result<Option<ScheduledRunRow>, SqliteError> {
    let row = sqlx::query_as::<_, RunTuple>(&format!(
        "SELECT {} FROM scheduled_runs WHERE id = ?",
        RUN_COLUMNS
    ))
    .bind(run_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_run))
}

/// List runs for a group, soonest scheduled first, undated runs last
pub async fn list_runs_for_group(
    pool: &SqlitePool,
    group_id: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<ScheduledRunRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, RunTuple>(&format!(
        r#"
        SELECT {} FROM scheduled_runs
        WHERE group_id = ?
        ORDER BY starts_at IS NULL, starts_at ASC, created_at DESC
        LIMIT ? OFFSET ?
        "#,
        RUN_COLUMNS
    ))
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM scheduled_runs WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(pool)
            .await?;

    Ok((rows.into_iter().map(row_to_run).collect(), total.0 as u64))
}

/// Update a scheduled run's fields and bump updated_at
#[allow(clippy::too_many_arguments)]
pub async fn update_run(
    pool: &SqlitePool,
    run_id: &str,
    title: Option<&str>,
    starts_at: Option<i64>,
    location: Option<&str>,
    pace: Option<&str>,
    distance_km: Option<f64>,
) -> Result<Option<ScheduledRunRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        UPDATE scheduled_runs
        SET title = COALESCE(?, title),
            starts_at = COALESCE(?, starts_at),
            location = COALESCE(?, location),
            pace = COALESCE(?, pace),
            distance_km = COALESCE(?, distance_km),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(starts_at)
    .bind(location)
    .bind(pace)
    .bind(distance_km)
    .bind(now)
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_run(pool, run_id).await
}

/// Delete a scheduled run. Attendance and comments cascade.
pub async fn delete_run(pool: &SqlitePool, run_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM scheduled_runs WHERE id = ?")
        .bind(run_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{attendance, group, user};
    use crate::data::sqlite::test_pool;
    use crate::data::types::AttendanceStatus;

    async fn seed(pool: &SqlitePool) {
        user::create_user(pool, "owner", "owner@example.com", None, "hash")
            .await
            .unwrap();
        group::create_group(pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_run() {
        let pool = test_pool().await;
        seed(&pool).await;

        let run = create_run(
            &pool,
            "r1",
            "g1",
            "owner",
            "Saturday long run",
            Some(1900000000),
            Some("River loop"),
            Some("5:30/km"),
            Some(21.1),
        )
        .await
        .unwrap();
        assert_eq!(run.title, "Saturday long run");
        assert!(run.updated_at.is_none());

        let fetched = get_run(&pool, "r1").await.unwrap().unwrap();
        assert_eq!(fetched.distance_km, Some(21.1));
    }

    #[tokio::test]
    async fn test_list_runs_dated_before_undated() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_run(&pool, "r1", "g1", "owner", "Undated", None, None, None, None)
            .await
            .unwrap();
        create_run(
            &pool, "r2", "g1", "owner", "Later", Some(2000), None, None, None,
        )
        .await
        .unwrap();
        create_run(
            &pool, "r3", "g1", "owner", "Sooner", Some(1000), None, None, None,
        )
        .await
        .unwrap();

        let (runs, total) = list_runs_for_group(&pool, "g1", 1, 10).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2", "r1"]);
    }

    #[tokio::test]
    async fn test_update_run_bumps_updated_at() {
        let pool = test_pool().await;
        seed(&pool).await;
        create_run(&pool, "r1", "g1", "owner", "Tempo", None, None, None, None)
            .await
            .unwrap();

        let updated = update_run(&pool, "r1", Some("Tempo v2"), None, None, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Tempo v2");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_run() {
        let pool = test_pool().await;
        assert!(update_run(&pool, "ghost", Some("x"), None, None, None, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_run_cascades_attendance() {
        let pool = test_pool().await;
        seed(&pool).await;
        create_run(&pool, "r1", "g1", "owner", "Tempo", None, None, None, None)
            .await
            .unwrap();
        attendance::set_attendance(&pool, "a1", "r1", "owner", AttendanceStatus::Going, None)
            .await
            .unwrap();

        assert!(delete_run(&pool, "r1").await.unwrap());

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE run_id = 'r1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
