//! Shoe repository for SQLite operations
//!
//! Mileage is always derived: base distance plus the sum of logged-run
//! distances. There is no stored counter to drift.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ShoeRow, ShoeWithMileage};

type ShoeTuple = (String, String, String, Option<String>, f64, i64, i64, i64);

fn row_to_shoe(
    (id, user_id, name, brand, base_distance_km, retired, created_at, updated_at): ShoeTuple,
) -> ShoeRow {
    ShoeRow {
        id,
        user_id,
        name,
        brand,
        base_distance_km,
        retired: retired != 0,
        created_at,
        updated_at,
    }
}

const SHOE_COLUMNS: &str =
    "id, user_id, name, brand, base_distance_km, retired, created_at, updated_at";

/// Create a shoe
pub async fn create_shoe(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    name: &str,
    brand: Option<&str>,
    base_distance_km: f64,
) -> Result<ShoeRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO shoes (id, user_id, name, brand, base_distance_km, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(brand)
    .bind(base_distance_km)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ShoeRow {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        brand: brand.map(String::from),
        base_distance_km,
        retired: false,
        created_at: now,
        updated_at: now,
    })
}

/// Get a shoe by ID
pub async fn get_shoe(pool: &SqlitePool, shoe_id: &str) -> Result<Option<ShoeRow>, SqliteError> {
    let row = sqlx::query_as::<_, ShoeTuple>(&format!(
        "SELECT {} FROM shoes WHERE id = ?",
        SHOE_COLUMNS
    ))
    .bind(shoe_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_shoe))
}

/// List a user's shoes with derived mileage, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ShoeWithMileage>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, String, String, Option<String>, f64, i64, i64, i64, f64)>(
        r#"
        SELECT s.id, s.user_id, s.name, s.brand, s.base_distance_km, s.retired,
               s.created_at, s.updated_at,
               s.base_distance_km + COALESCE(SUM(a.distance_km), 0) AS total_km
        FROM shoes s
        LEFT JOIN activities a ON a.shoe_id = s.id
        WHERE s.user_id = ?
        GROUP BY s.id
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, user_id, name, brand, base_distance_km, retired, created_at, updated_at, total_km)| {
                ShoeWithMileage {
                    shoe: ShoeRow {
                        id,
                        user_id,
                        name,
                        brand,
                        base_distance_km,
                        retired: retired != 0,
                        created_at,
                        updated_at,
                    },
                    total_distance_km: total_km,
                }
            },
        )
        .collect())
}

/// Derived mileage for one shoe
pub async fn mileage(pool: &SqlitePool, shoe_id: &str) -> Result<Option<f64>, SqliteError> {
    let row: Option<(f64,)> = sqlx::query_as(
        r#"
        SELECT s.base_distance_km + COALESCE(SUM(a.distance_km), 0)
        FROM shoes s
        LEFT JOIN activities a ON a.shoe_id = s.id
        WHERE s.id = ?
        GROUP BY s.id
        "#,
    )
    .bind(shoe_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(km,)| km))
}

/// Update a shoe's fields (retire/unretire via the flag)
pub async fn update_shoe(
    pool: &SqlitePool,
    shoe_id: &str,
    name: Option<&str>,
    brand: Option<&str>,
    retired: Option<bool>,
) -> Result<Option<ShoeRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        UPDATE shoes
        SET name = COALESCE(?, name),
            brand = COALESCE(?, brand),
            retired = COALESCE(?, retired),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(brand)
    .bind(retired.map(|r| r as i64))
    .bind(now)
    .bind(shoe_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_shoe(pool, shoe_id).await
}

/// Delete a shoe. Activities keep their row with shoe_id set NULL.
pub async fn delete_shoe(pool: &SqlitePool, shoe_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM shoes WHERE id = ?")
        .bind(shoe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{activity, user};
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        user::create_user(pool, "runner", "runner@example.com", None, "hash")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mileage_is_derived_from_activities() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_shoe(&pool, "s1", "runner", "Pegasus", Some("Nike"), 50.0)
            .await
            .unwrap();

        assert_eq!(mileage(&pool, "s1").await.unwrap(), Some(50.0));

        activity::create_activity(
            &pool, "a1", "runner", Some("s1"), None, 10.0, None, "2025-06-01", None,
        )
        .await
        .unwrap();
        activity::create_activity(
            &pool, "a2", "runner", Some("s1"), None, 5.5, None, "2025-06-02", None,
        )
        .await
        .unwrap();

        assert_eq!(mileage(&pool, "s1").await.unwrap(), Some(65.5));
    }

    #[tokio::test]
    async fn test_list_for_user_includes_mileage() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_shoe(&pool, "s1", "runner", "Pegasus", None, 0.0)
            .await
            .unwrap();
        activity::create_activity(
            &pool, "a1", "runner", Some("s1"), None, 12.0, None, "2025-06-01", None,
        )
        .await
        .unwrap();

        let shoes = list_for_user(&pool, "runner").await.unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].total_distance_km, 12.0);
    }

    #[tokio::test]
    async fn test_retire_shoe() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_shoe(&pool, "s1", "runner", "Pegasus", None, 0.0)
            .await
            .unwrap();
        let updated = update_shoe(&pool, "s1", None, None, Some(true))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.retired);
    }

    #[tokio::test]
    async fn test_delete_shoe_detaches_activities() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_shoe(&pool, "s1", "runner", "Pegasus", None, 0.0)
            .await
            .unwrap();
        activity::create_activity(
            &pool, "a1", "runner", Some("s1"), None, 12.0, None, "2025-06-01", None,
        )
        .await
        .unwrap();

        assert!(delete_shoe(&pool, "s1").await.unwrap());

        let shoe_id: Option<String> =
            sqlx::query_scalar("SELECT shoe_id FROM activities WHERE id = 'a1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(shoe_id.is_none());
    }
}
