//! Group chat message repository for SQLite operations
//!
//! Persistence and broadcast are deliberately separate steps: the route
//! commits here first, then publishes to the group's topic.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::MessageWithAuthor;

type MessageTuple = (String, String, String, Option<String>, String, i64);

fn row_to_message(
    (id, group_id, author_id, author_name, body, created_at): MessageTuple,
) -> MessageWithAuthor {
    MessageWithAuthor {
        id,
        group_id,
        author_id,
        author_name,
        body,
        created_at,
    }
}

/// Persist a chat message
pub async fn create_message(
    pool: &SqlitePool,
    id: &str,
    group_id: &str,
    author_id: &str,
    body: &str,
) -> Result<MessageWithAuthor, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO group_messages (id, group_id, author_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(group_id)
    .bind(author_id)
    .bind(body)
    .bind(now)
    .execute(pool)
    .await?;

    let author_name: Option<String> =
        sqlx::query_scalar("SELECT display_name FROM users WHERE id = ?")
            .bind(author_id)
            .fetch_optional(pool)
            .await?
            .flatten();

    Ok(MessageWithAuthor {
        id: id.to_string(),
        group_id: group_id.to_string(),
        author_id: author_id.to_string(),
        author_name,
        body: body.to_string(),
        created_at: now,
    })
}

/// Get a message by ID
pub async fn get_message(
    pool: &SqlitePool,
    message_id: &str,
) -> Result<Option<MessageWithAuthor>, SqliteError> {
    let row = sqlx::query_as::<_, MessageTuple>(
        r#"
        SELECT m.id, m.group_id, m.author_id, u.display_name, m.body, m.created_at
        FROM group_messages m
        JOIN users u ON m.author_id = u.id
        WHERE m.id = ?
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_message))
}

/// List recent messages for a group, newest page first but each page in
/// chronological order
pub async fn list_for_group(
    pool: &SqlitePool,
    group_id: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<MessageWithAuthor>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, MessageTuple>(
        r#"
        SELECT id, group_id, author_id, author_name, body, created_at FROM (
            SELECT m.id, m.group_id, m.author_id, u.display_name AS author_name,
                   m.body, m.created_at
            FROM group_messages m
            JOIN users u ON m.author_id = u.id
            WHERE m.group_id = ?
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ? OFFSET ?
        )
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM group_messages WHERE group_id = ?")
        .bind(group_id)
        .fetch_one(pool)
        .await?;

    Ok((
        rows.into_iter().map(row_to_message).collect(),
        total.0 as u64,
    ))
}

/// Delete a message
pub async fn delete_message(pool: &SqlitePool, message_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM group_messages WHERE id = ?")
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{group, user};
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        user::create_user(pool, "owner", "owner@example.com", Some("Owner"), "hash")
            .await
            .unwrap();
        group::create_group(pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_message() {
        let pool = test_pool().await;
        seed(&pool).await;

        let message = create_message(&pool, "m1", "g1", "owner", "6am tomorrow?")
            .await
            .unwrap();
        assert_eq!(message.author_name.as_deref(), Some("Owner"));

        let fetched = get_message(&pool, "m1").await.unwrap().unwrap();
        assert_eq!(fetched.body, "6am tomorrow?");
    }

    #[tokio::test]
    async fn test_list_page_in_chronological_order() {
        let pool = test_pool().await;
        seed(&pool).await;

        for i in 0..5 {
            create_message(&pool, &format!("m{}", i), "g1", "owner", &format!("msg {}", i))
                .await
                .unwrap();
        }

        let (messages, total) = list_for_group(&pool, "g1", 1, 10).await.unwrap();
        assert_eq!(total, 5);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_delete_message() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_message(&pool, "m1", "g1", "owner", "x").await.unwrap();
        assert!(delete_message(&pool, "m1").await.unwrap());
        assert!(get_message(&pool, "m1").await.unwrap().is_none());
    }
}
