//! Challenge repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ChallengeRow;

type ChallengeTuple = (
    String,
    String,
    Option<String>,
    String,
    Option<f64>,
    String,
    String,
    i64,
    i64,
    String,
    i64,
    i64,
);

fn row_to_challenge(
    (id, title, description, kind, required_km_per_day, start_date, end_date, is_public, is_active, created_by, created_at, updated_at): ChallengeTuple,
) -> ChallengeRow {
    ChallengeRow {
        id,
        title,
        description,
        kind,
        required_km_per_day,
        start_date,
        end_date,
        is_public: is_public != 0,
        is_active: is_active != 0,
        created_by,
        created_at,
        updated_at,
    }
}

const CHALLENGE_COLUMNS: &str = "id, title, description, kind, required_km_per_day, start_date, end_date, is_public, is_active, created_by, created_at, updated_at";

/// Create a challenge. The end-after-start invariant is a CHECK constraint.
#[allow(clippy::too_many_arguments)]
pub async fn create_challenge(
    pool: &SqlitePool,
    id: &str,
    title: &str,
    description: Option<&str>,
    kind: &str,
    required_km_per_day: Option<f64>,
    start_date: &str,
    end_date: &str,
    is_public: bool,
    created_by: &str,
) -> Result<ChallengeRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO challenges (id, title, description, kind, required_km_per_day, start_date, end_date, is_public, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(kind)
    .bind(required_km_per_day)
    .bind(start_date)
    .bind(end_date)
    .bind(is_public as i64)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ChallengeRow {
        id: id.to_string(),
        title: title.to_string(),
        description: description.map(String::from),
        kind: kind.to_string(),
        required_km_per_day,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        is_public,
        is_active: true,
        created_by: created_by.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a challenge by ID
pub async fn get_challenge(
    pool: &SqlitePool,
    challenge_id: &str,
) -> Result<Option<ChallengeRow>, SqliteError> {
    let row = sqlx::query_as::<_, ChallengeTuple>(&format!(
        "SELECT {} FROM challenges WHERE id = ?",
        CHALLENGE_COLUMNS
    ))
    .bind(challenge_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_challenge))
}

/// List public challenges, soonest-ending active ones first
pub async fn list_public(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<ChallengeRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, ChallengeTuple>(&format!(
        r#"
        SELECT {} FROM challenges
        WHERE is_public = 1
        ORDER BY is_active DESC, end_date ASC
        LIMIT ? OFFSET ?
        "#,
        CHALLENGE_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM challenges WHERE is_public = 1")
        .fetch_one(pool)
        .await?;

    Ok((
        rows.into_iter().map(row_to_challenge).collect(),
        total.0 as u64,
    ))
}

/// List active challenges a user has joined (for progress fan-out)
pub async fn list_joined_active(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ChallengeRow>, SqliteError> {
    let rows = sqlx::query_as::<_, ChallengeTuple>(&format!(
        r#"
        SELECT {} FROM challenges c
        JOIN challenge_progress cp ON cp.challenge_id = c.id
        WHERE cp.user_id = ? AND c.is_active = 1
        ORDER BY c.end_date ASC
        "#,
        CHALLENGE_COLUMNS
            .split(", ")
            .map(|c| format!("c.{}", c))
            .collect::<Vec<_>>()
            .join(", ")
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_challenge).collect())
}

/// Update a challenge's mutable fields (creator only, checked at the route)
pub async fn update_challenge(
    pool: &SqlitePool,
    challenge_id: &str,
    title: Option<&str>,
    description: Option<&str>,
    is_public: Option<bool>,
    is_active: Option<bool>,
) -> Result<Option<ChallengeRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        UPDATE challenges
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public),
            is_active = COALESCE(?, is_active),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(is_public.map(|v| v as i64))
    .bind(is_active.map(|v| v as i64))
    .bind(now)
    .bind(challenge_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_challenge(pool, challenge_id).await
}

/// Delete a challenge. Progress rows cascade.
pub async fn delete_challenge(pool: &SqlitePool, challenge_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM challenges WHERE id = ?")
        .bind(challenge_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{progress, user};
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        user::create_user(pool, "creator", "creator@example.com", None, "hash")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_challenge() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_challenge(
            &pool,
            "c1",
            "June 100k",
            None,
            "total_distance",
            Some(3.3),
            "2025-06-01",
            "2025-07-01",
            true,
            "creator",
        )
        .await
        .unwrap();

        let fetched = get_challenge(&pool, "c1").await.unwrap().unwrap();
        assert_eq!(fetched.kind, "total_distance");
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_end_date_must_follow_start_date() {
        let pool = test_pool().await;
        seed(&pool).await;

        let result = create_challenge(
            &pool,
            "c1",
            "Backwards",
            None,
            "custom",
            None,
            "2025-07-01",
            "2025-06-01",
            true,
            "creator",
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_joined_active() {
        let pool = test_pool().await;
        seed(&pool).await;
        user::create_user(&pool, "runner", "runner@example.com", None, "hash")
            .await
            .unwrap();

        create_challenge(
            &pool, "c1", "A", None, "custom", None, "2025-06-01", "2025-07-01", true, "creator",
        )
        .await
        .unwrap();
        create_challenge(
            &pool, "c2", "B", None, "custom", None, "2025-06-01", "2025-07-01", true, "creator",
        )
        .await
        .unwrap();

        progress::join(&pool, "p1", "c1", "runner").await.unwrap();

        let joined = list_joined_active(&pool, "runner").await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].id, "c1");

        // Deactivating removes it from the fan-out set
        update_challenge(&pool, "c1", None, None, None, Some(false))
            .await
            .unwrap();
        assert!(list_joined_active(&pool, "runner").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_challenge_cascades_progress() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_challenge(
            &pool, "c1", "A", None, "custom", None, "2025-06-01", "2025-07-01", true, "creator",
        )
        .await
        .unwrap();
        progress::join(&pool, "p1", "c1", "creator").await.unwrap();

        assert!(delete_challenge(&pool, "c1").await.unwrap());

        let rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM challenge_progress WHERE challenge_id = 'c1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 0);
    }
}
