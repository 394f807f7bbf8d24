//! Individual run log repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ActivityRow;

type ActivityTuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    f64,
    Option<i64>,
    String,
    Option<String>,
    i64,
);

fn row_to_activity(
    (id, user_id, shoe_id, title, distance_km, duration_secs, run_date, notes, created_at): ActivityTuple,
) -> ActivityRow {
    ActivityRow {
        id,
        user_id,
        shoe_id,
        title,
        distance_km,
        duration_secs,
        run_date,
        notes,
        created_at,
    }
}

const ACTIVITY_COLUMNS: &str =
    "id, user_id, shoe_id, title, distance_km, duration_secs, run_date, notes, created_at";

/// Log an individual run
#[allow(clippy::too_many_arguments)]
pub async fn create_activity(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    shoe_id: Option<&str>,
    title: Option<&str>,
    distance_km: f64,
    duration_secs: Option<i64>,
    run_date: &str,
    notes: Option<&str>,
) -> Result<ActivityRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO activities (id, user_id, shoe_id, title, distance_km, duration_secs, run_date, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(shoe_id)
    .bind(title)
    .bind(distance_km)
    .bind(duration_secs)
    .bind(run_date)
    .bind(notes)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ActivityRow {
        id: id.to_string(),
        user_id: user_id.to_string(),
        shoe_id: shoe_id.map(String::from),
        title: title.map(String::from),
        distance_km,
        duration_secs,
        run_date: run_date.to_string(),
        notes: notes.map(String::from),
        created_at: now,
    })
}

/// Get an activity by ID
pub async fn get_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<Option<ActivityRow>, SqliteError> {
    let row = sqlx::query_as::<_, ActivityTuple>(&format!(
        "SELECT {} FROM activities WHERE id = ?",
        ACTIVITY_COLUMNS
    ))
    .bind(activity_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_activity))
}

/// List a user's logged runs, most recent run date first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<ActivityRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, ActivityTuple>(&format!(
        r#"
        SELECT {} FROM activities
        WHERE user_id = ?
        ORDER BY run_date DESC, created_at DESC
        LIMIT ? OFFSET ?
        "#,
        ACTIVITY_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok((
        rows.into_iter().map(row_to_activity).collect(),
        total.0 as u64,
    ))
}

/// Delete a logged run
pub async fn delete_activity(pool: &SqlitePool, activity_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM activities WHERE id = ?")
        .bind(activity_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::user;
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        user::create_user(pool, "runner", "runner@example.com", None, "hash")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_activity() {
        let pool = test_pool().await;
        seed(&pool).await;

        let activity = create_activity(
            &pool,
            "a1",
            "runner",
            None,
            Some("Morning 10k"),
            10.0,
            Some(3000),
            "2025-06-01",
            None,
        )
        .await
        .unwrap();
        assert_eq!(activity.run_date, "2025-06-01");

        let fetched = get_activity(&pool, "a1").await.unwrap().unwrap();
        assert_eq!(fetched.distance_km, 10.0);
        assert_eq!(fetched.duration_secs, Some(3000));
    }

    #[tokio::test]
    async fn test_list_ordered_by_run_date_desc() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_activity(&pool, "a1", "runner", None, None, 5.0, None, "2025-06-01", None)
            .await
            .unwrap();
        create_activity(&pool, "a2", "runner", None, None, 5.0, None, "2025-06-03", None)
            .await
            .unwrap();
        create_activity(&pool, "a3", "runner", None, None, 5.0, None, "2025-06-02", None)
            .await
            .unwrap();

        let (activities, total) = list_for_user(&pool, "runner", 1, 10).await.unwrap();
        assert_eq!(total, 3);
        let dates: Vec<&str> = activities.iter().map(|a| a.run_date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-03", "2025-06-02", "2025-06-01"]);
    }

    #[tokio::test]
    async fn test_delete_activity() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_activity(&pool, "a1", "runner", None, None, 5.0, None, "2025-06-01", None)
            .await
            .unwrap();
        assert!(delete_activity(&pool, "a1").await.unwrap());
        assert!(get_activity(&pool, "a1").await.unwrap().is_none());
    }
}
