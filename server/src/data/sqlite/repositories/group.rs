//! Group repository for SQLite operations
//!
//! The owner is fixed at creation and never holds a membership row - every
//! member count here adds 1 for the implicit owner.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{GroupRow, GroupWithMemberCount};

type GroupTuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
    i64,
);

fn row_to_group(
    (id, name, description, location, avatar_url, owner_id, created_at, updated_at): GroupTuple,
) -> GroupRow {
    GroupRow {
        id,
        name,
        description,
        location,
        avatar_url,
        owner_id,
        created_at,
        updated_at,
    }
}

const GROUP_COLUMNS: &str =
    "id, name, description, location, avatar_url, owner_id, created_at, updated_at";

/// Create a group owned by `owner_id`
pub async fn create_group(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    description: Option<&str>,
    location: Option<&str>,
    owner_id: &str,
) -> Result<GroupRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO groups (id, name, description, location, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(location)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(GroupRow {
        id: id.to_string(),
        name: name.to_string(),
        description: description.map(String::from),
        location: location.map(String::from),
        avatar_url: None,
        owner_id: owner_id.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a group by ID
pub async fn get_group(pool: &SqlitePool, group_id: &str) -> Result<Option<GroupRow>, SqliteError> {
    let row = sqlx::query_as::<_, GroupTuple>(&format!(
        "SELECT {} FROM groups WHERE id = ?",
        GROUP_COLUMNS
    ))
    .bind(group_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_group))
}

/// List all groups with derived member counts, newest first
pub async fn list_groups(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<GroupWithMemberCount>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>, Option<String>, String, i64, i64, i64)>(
        r#"
        SELECT g.id, g.name, g.description, g.location, g.avatar_url, g.owner_id,
               g.created_at, g.updated_at,
               (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id) AS members
        FROM groups g
        ORDER BY g.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;

    let groups = rows
        .into_iter()
        .map(
            |(id, name, description, location, avatar_url, owner_id, created_at, updated_at, members)| {
                GroupWithMemberCount {
                    group: GroupRow {
                        id,
                        name,
                        description,
                        location,
                        avatar_url,
                        owner_id,
                        created_at,
                        updated_at,
                    },
                    // +1 for the implicit owner
                    member_count: members as u64 + 1,
                }
            },
        )
        .collect();

    Ok((groups, total.0 as u64))
}

/// List groups the user belongs to (owned or joined), newest first
pub async fn list_groups_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<GroupRow>, SqliteError> {
    let rows = sqlx::query_as::<_, GroupTuple>(&format!(
        r#"
        SELECT {cols} FROM groups WHERE owner_id = ?
        UNION
        SELECT {cols} FROM groups g
        JOIN group_members gm ON gm.group_id = g.id
        WHERE gm.user_id = ?
        ORDER BY created_at DESC
        "#,
        cols = GROUP_COLUMNS
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_group).collect())
}

/// Update a group's mutable fields
pub async fn update_group(
    pool: &SqlitePool,
    group_id: &str,
    name: Option<&str>,
    description: Option<&str>,
    location: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<Option<GroupRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        UPDATE groups
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            location = COALESCE(?, location),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(location)
    .bind(avatar_url)
    .bind(now)
    .bind(group_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_group(pool, group_id).await
}

/// Delete a group. Memberships, scheduled runs (and transitively their
/// attendance and comments) and chat history cascade at the storage layer.
pub async fn delete_group(pool: &SqlitePool, group_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(group_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{membership, run, user};
    use crate::data::sqlite::test_pool;

    async fn seed_user(pool: &SqlitePool, id: &str) {
        user::create_user(pool, id, &format!("{}@example.com", id), None, "hash")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_group() {
        let pool = test_pool().await;
        seed_user(&pool, "owner").await;

        let group = create_group(&pool, "g1", "Morning Crew", Some("Dawn runs"), None, "owner")
            .await
            .unwrap();
        assert_eq!(group.owner_id, "owner");

        let fetched = get_group(&pool, "g1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Morning Crew");
    }

    #[tokio::test]
    async fn test_list_groups_counts_implicit_owner() {
        let pool = test_pool().await;
        seed_user(&pool, "owner").await;
        seed_user(&pool, "runner").await;
        create_group(&pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
        membership::join(&pool, "g1", "runner").await.unwrap();

        let (groups, total) = list_groups(&pool, 1, 10).await.unwrap();
        // Seeded default group plus ours
        assert_eq!(total, 2);
        let g1 = groups.iter().find(|g| g.group.id == "g1").unwrap();
        // one membership row + the implicit owner
        assert_eq!(g1.member_count, 2);
    }

    #[tokio::test]
    async fn test_list_groups_for_user_includes_owned_and_joined() {
        let pool = test_pool().await;
        seed_user(&pool, "owner").await;
        seed_user(&pool, "runner").await;
        create_group(&pool, "g1", "Owned", None, None, "runner")
            .await
            .unwrap();
        create_group(&pool, "g2", "Joined", None, None, "owner")
            .await
            .unwrap();
        membership::join(&pool, "g2", "runner").await.unwrap();

        let groups = list_groups_for_user(&pool, "runner").await.unwrap();
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert!(ids.contains(&"g1"));
        assert!(ids.contains(&"g2"));
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_group_cascades() {
        let pool = test_pool().await;
        seed_user(&pool, "owner").await;
        seed_user(&pool, "runner").await;
        create_group(&pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
        membership::join(&pool, "g1", "runner").await.unwrap();
        run::create_run(&pool, "r1", "g1", "owner", "Tempo", None, None, None, None)
            .await
            .unwrap();

        assert!(delete_group(&pool, "g1").await.unwrap());

        let memberships: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM group_members WHERE group_id = 'g1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(memberships, 0);

        let runs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_runs WHERE group_id = 'g1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(runs, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_group() {
        let pool = test_pool().await;
        assert!(!delete_group(&pool, "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_deletion_restricted() {
        let pool = test_pool().await;
        seed_user(&pool, "owner").await;
        create_group(&pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();

        // Owner authored a durable group; deleting the user must fail
        let result = sqlx::query("DELETE FROM users WHERE id = 'owner'")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
