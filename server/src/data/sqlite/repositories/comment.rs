//! Run comment repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{CommentWithAuthor, RunCommentRow};

/// Create a comment on a scheduled run
pub async fn create_comment(
    pool: &SqlitePool,
    id: &str,
    run_id: &str,
    author_id: &str,
    body: &str,
) -> Result<RunCommentRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO run_comments (id, run_id, author_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(run_id)
    .bind(author_id)
    .bind(body)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(RunCommentRow {
        id: id.to_string(),
        run_id: run_id.to_string(),
        author_id: author_id.to_string(),
        body: body.to_string(),
        created_at: now,
    })
}

/// Get a comment by ID
pub async fn get_comment(
    pool: &SqlitePool,
    comment_id: &str,
) -> Result<Option<RunCommentRow>, SqliteError> {
    let row = sqlx::query_as::<_, (String, String, String, String, i64)>(
        "SELECT id, run_id, author_id, body, created_at FROM run_comments WHERE id = ?",
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, run_id, author_id, body, created_at)| RunCommentRow {
        id,
        run_id,
        author_id,
        body,
        created_at,
    }))
}

/// List comments for a run with author names, oldest first
pub async fn list_for_run(
    pool: &SqlitePool,
    run_id: &str,
) -> Result<Vec<CommentWithAuthor>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, String, String, String, i64, Option<String>)>(
        r#"
        SELECT c.id, c.run_id, c.author_id, c.body, c.created_at, u.display_name
        FROM run_comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.run_id = ?
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, run_id, author_id, body, created_at, author_name)| CommentWithAuthor {
                comment: RunCommentRow {
                    id,
                    run_id,
                    author_id,
                    body,
                    created_at,
                },
                author_name,
            },
        )
        .collect())
}

/// Delete a comment
pub async fn delete_comment(pool: &SqlitePool, comment_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM run_comments WHERE id = ?")
        .bind(comment_id)
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
        user::create_user(pool, "owner", "owner@example.com", Some("Owner"), "hash")
            .await
            .unwrap();
        group::create_group(pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
        run::create_run(pool, "r1", "g1", "owner", "Tempo", None, None, None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_list_comments() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_comment(&pool, "c1", "r1", "owner", "See you there")
            .await
            .unwrap();
        create_comment(&pool, "c2", "r1", "owner", "Bring water")
            .await
            .unwrap();

        let comments = list_for_run(&pool, "r1").await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment.body, "See you there");
        assert_eq!(comments[0].author_name.as_deref(), Some("Owner"));
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let pool = test_pool().await;
        seed(&pool).await;

        create_comment(&pool, "c1", "r1", "owner", "x").await.unwrap();
        assert!(delete_comment(&pool, "c1").await.unwrap());
        assert!(get_comment(&pool, "c1").await.unwrap().is_none());
        assert!(!delete_comment(&pool, "c1").await.unwrap());
    }
}
