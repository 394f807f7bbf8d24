//! Group membership repository for SQLite operations
//!
//! At most one membership row per (group, user) - enforced by the table's
//! primary key, not by application checks. The group owner is a member by
//! definition and never holds a row; `is_member` folds the owner in.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{MemberWithUser, MembershipRow};

/// Outcome of a join attempt
#[derive(Debug, Clone)]
pub enum JoinResult {
    Joined(MembershipRow),
    /// Already a member (existing row, or the user owns the group)
    AlreadyMember,
    GroupNotFound,
}

/// Outcome of a leave attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveResult {
    Left,
    /// The owner cannot leave their own group
    OwnerCannotLeave,
    NotAMember,
    GroupNotFound,
}

/// Join a group. Duplicate joins are rejected by the primary key.
pub async fn join(
    pool: &SqlitePool,
    group_id: &str,
    user_id: &str,
) -> Result<JoinResult, SqliteError> {
    let owner: Option<(String,)> = sqlx::query_as("SELECT owner_id FROM groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

    let Some((owner_id,)) = owner else {
        return Ok(JoinResult::GroupNotFound);
    };

    if owner_id == user_id {
        // Owner is implicitly a member; a row would be a second source of truth
        return Ok(JoinResult::AlreadyMember);
    }

    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO group_members (group_id, user_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(group_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(JoinResult::Joined(MembershipRow {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
        })),
        Err(e) => {
            let err = SqliteError::from(e);
            if err.is_unique_violation() {
                Ok(JoinResult::AlreadyMember)
            } else {
                Err(err)
            }
        }
    }
}

/// Leave a group. The owner is refused; a non-member gets NotAMember.
pub async fn leave(
    pool: &SqlitePool,
    group_id: &str,
    user_id: &str,
) -> Result<LeaveResult, SqliteError> {
    let owner: Option<(String,)> = sqlx::query_as("SELECT owner_id FROM groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

    let Some((owner_id,)) = owner else {
        return Ok(LeaveResult::GroupNotFound);
    };

    if owner_id == user_id {
        return Ok(LeaveResult::OwnerCannotLeave);
    }

    let result = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        Ok(LeaveResult::NotAMember)
    } else {
        Ok(LeaveResult::Left)
    }
}

/// Membership predicate: a row exists, or the user owns the group
pub async fn is_member(
    pool: &SqlitePool,
    group_id: &str,
    user_id: &str,
) -> Result<bool, SqliteError> {
    let found: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM group_members WHERE group_id = ? AND user_id = ?
            UNION
            SELECT 1 FROM groups WHERE id = ? AND owner_id = ?
        )
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .bind(group_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(found)
}

/// Get a specific membership row (the owner has none)
pub async fn get_membership(
    pool: &SqlitePool,
    group_id: &str,
    user_id: &str,
) -> Result<Option<MembershipRow>, SqliteError> {
    let row = sqlx::query_as::<_, (String, String, i64)>(
        "SELECT group_id, user_id, created_at FROM group_members WHERE group_id = ? AND user_id = ?",
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(group_id, user_id, created_at)| MembershipRow {
        group_id,
        user_id,
        created_at,
    }))
}

/// List all members of a group with user info, owner first then by join time
pub async fn list_members(
    pool: &SqlitePool,
    group_id: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<MemberWithUser>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>, i64, i64)>(
        r#"
        SELECT u.id, u.email, u.display_name, u.avatar_url, 1 AS is_owner, g.created_at
        FROM groups g
        JOIN users u ON u.id = g.owner_id
        WHERE g.id = ?
        UNION ALL
        SELECT u.id, u.email, u.display_name, u.avatar_url, 0 AS is_owner, gm.created_at
        FROM group_members gm
        JOIN users u ON gm.user_id = u.id
        WHERE gm.group_id = ?
        ORDER BY is_owner DESC, created_at ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(group_id)
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = member_count(pool, group_id).await?;

    let members = rows
        .into_iter()
        .map(
            |(user_id, email, display_name, avatar_url, is_owner, joined_at)| MemberWithUser {
                user_id,
                email,
                display_name,
                avatar_url,
                is_owner: is_owner != 0,
                joined_at,
            },
        )
        .collect();

    Ok((members, total))
}

/// Derived member count: membership rows plus the implicit owner
pub async fn member_count(pool: &SqlitePool, group_id: &str) -> Result<u64, SqliteError> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT (SELECT COUNT(*) FROM group_members WHERE group_id = ?)
             + (SELECT COUNT(*) FROM groups WHERE id = ?)
        "#,
    )
    .bind(group_id)
    .bind(group_id)
    .fetch_one(pool)
    .await?;

    Ok(count.0 as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{group, user};
    use crate::data::sqlite::test_pool;

    async fn seed(pool: &SqlitePool) {
        for id in ["owner", "runner", "other"] {
            user::create_user(pool, id, &format!("{}@example.com", id), None, "hash")
                .await
                .unwrap();
        }
        group::create_group(pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_join_twice_yields_one_row() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert!(matches!(
            join(&pool, "g1", "runner").await.unwrap(),
            JoinResult::Joined(_)
        ));
        assert!(matches!(
            join(&pool, "g1", "runner").await.unwrap(),
            JoinResult::AlreadyMember
        ));

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_members WHERE group_id = 'g1' AND user_id = 'runner'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_owner_join_is_conflict_without_row() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert!(matches!(
            join(&pool, "g1", "owner").await.unwrap(),
            JoinResult::AlreadyMember
        ));

        let rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM group_members WHERE user_id = 'owner'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_join_missing_group() {
        let pool = test_pool().await;
        seed(&pool).await;
        assert!(matches!(
            join(&pool, "ghost", "runner").await.unwrap(),
            JoinResult::GroupNotFound
        ));
    }

    #[tokio::test]
    async fn test_owner_cannot_leave() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert_eq!(
            leave(&pool, "g1", "owner").await.unwrap(),
            LeaveResult::OwnerCannotLeave
        );
    }

    #[tokio::test]
    async fn test_leave() {
        let pool = test_pool().await;
        seed(&pool).await;

        join(&pool, "g1", "runner").await.unwrap();
        assert_eq!(leave(&pool, "g1", "runner").await.unwrap(), LeaveResult::Left);
        assert_eq!(
            leave(&pool, "g1", "runner").await.unwrap(),
            LeaveResult::NotAMember
        );
    }

    #[tokio::test]
    async fn test_is_member_owner_implicit() {
        let pool = test_pool().await;
        seed(&pool).await;

        // Owner has no row but is a member
        assert!(is_member(&pool, "g1", "owner").await.unwrap());
        assert!(!is_member(&pool, "g1", "runner").await.unwrap());

        join(&pool, "g1", "runner").await.unwrap();
        assert!(is_member(&pool, "g1", "runner").await.unwrap());
        assert!(!is_member(&pool, "g1", "other").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_members_owner_first() {
        let pool = test_pool().await;
        seed(&pool).await;
        join(&pool, "g1", "runner").await.unwrap();
        join(&pool, "g1", "other").await.unwrap();

        let (members, total) = list_members(&pool, "g1", 1, 10).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(members.len(), 3);
        assert!(members[0].is_owner);
        assert_eq!(members[0].user_id, "owner");
    }

    #[tokio::test]
    async fn test_member_count_derived() {
        let pool = test_pool().await;
        seed(&pool).await;

        assert_eq!(member_count(&pool, "g1").await.unwrap(), 1);
        join(&pool, "g1", "runner").await.unwrap();
        assert_eq!(member_count(&pool, "g1").await.unwrap(), 2);
        leave(&pool, "g1", "runner").await.unwrap();
        assert_eq!(member_count(&pool, "g1").await.unwrap(), 1);
    }
}
