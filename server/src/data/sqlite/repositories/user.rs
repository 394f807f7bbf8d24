//! User repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::UserRow;

type UserTuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

fn row_to_user(
    (id, email, display_name, avatar_url, password_hash, created_at, updated_at): UserTuple,
) -> UserRow {
    UserRow {
        id,
        email,
        display_name,
        avatar_url,
        password_hash,
        created_at,
        updated_at,
    }
}

const USER_COLUMNS: &str = "id, email, display_name, avatar_url, password_hash, created_at, updated_at";

/// Create a user. Email uniqueness is a storage constraint; a duplicate
/// surfaces as a unique violation, not a pre-check.
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    display_name: Option<&str>,
    password_hash: &str,
) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(display_name)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(UserRow {
        id: id.to_string(),
        email: email.to_string(),
        display_name: display_name.map(String::from),
        avatar_url: None,
        password_hash: Some(password_hash.to_string()),
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

/// Get a user by email (login lookup)
pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

/// Update a user's profile fields
pub async fn update_user(
    pool: &SqlitePool,
    user_id: &str,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<Option<UserRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = COALESCE(?, display_name),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(display_name)
    .bind(avatar_url)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_user(pool, user_id).await
}

/// Replace a user's credential hash (change password)
pub async fn update_password_hash(
    pool: &SqlitePool,
    user_id: &str,
    password_hash: &str,
) -> Result<bool, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::test_pool;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let pool = test_pool().await;

        let user = create_user(&pool, "u1", "ada@example.com", Some("Ada"), "hash")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        let fetched = get_user(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(fetched.display_name.as_deref(), Some("Ada"));
        assert_eq!(fetched.password_hash.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_storage_enforced() {
        let pool = test_pool().await;

        create_user(&pool, "u1", "ada@example.com", None, "hash")
            .await
            .unwrap();
        let err = create_user(&pool, "u2", "ada@example.com", None, "hash")
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_get_user_by_email() {
        let pool = test_pool().await;

        create_user(&pool, "u1", "ada@example.com", None, "hash")
            .await
            .unwrap();
        let fetched = get_user_by_email(&pool, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, "u1");

        assert!(get_user_by_email(&pool, "nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let pool = test_pool().await;

        create_user(&pool, "u1", "ada@example.com", Some("Ada"), "hash")
            .await
            .unwrap();

        let updated = update_user(&pool, "u1", None, Some("/uploads/avatar/x.png"))
            .await
            .unwrap()
            .unwrap();
        // COALESCE keeps the existing name when not provided
        assert_eq!(updated.display_name.as_deref(), Some("Ada"));
        assert_eq!(updated.avatar_url.as_deref(), Some("/uploads/avatar/x.png"));
    }

    #[tokio::test]
    async fn test_update_user_missing() {
        let pool = test_pool().await;
        assert!(update_user(&pool, "ghost", Some("x"), None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let pool = test_pool().await;

        create_user(&pool, "u1", "ada@example.com", None, "old")
            .await
            .unwrap();
        assert!(update_password_hash(&pool, "u1", "new").await.unwrap());

        let fetched = get_user(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(fetched.password_hash.as_deref(), Some("new"));

        assert!(!update_password_hash(&pool, "ghost", "new").await.unwrap());
    }
}
