//! Authentication context and authorization service
//!
//! Identity is always an explicit `AuthContext` injected by middleware and
//! passed into operations - never inferred from ambient state or query
//! parameters. `AuthService` holds the DB-backed authorization predicates.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::{group, membership};
use crate::data::types::GroupRow;

/// Authentication context for a request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Session-authenticated user via JWT
    Session { user_id: String },
    /// Default local user (--no-auth mode)
    LocalDefault { user_id: String },
}

impl AuthContext {
    /// The authenticated user's ID
    pub fn user_id(&self) -> &str {
        match self {
            Self::Session { user_id } | Self::LocalDefault { user_id } => user_id,
        }
    }
}

/// Authorization service with group-scoped predicates
#[derive(Clone)]
pub struct AuthService {
    database: Arc<SqliteService>,
}

impl AuthService {
    pub fn new(database: Arc<SqliteService>) -> Self {
        Self { database }
    }

    fn pool(&self) -> &SqlitePool {
        self.database.pool()
    }

    /// Fetch a group or fail with NotFound
    pub async fn require_group(&self, group_id: &str) -> Result<GroupRow, ApiError> {
        group::get_group(self.pool(), group_id)
            .await
            .map_err(ApiError::from_sqlite)?
            .ok_or_else(|| {
                ApiError::not_found("GROUP_NOT_FOUND", format!("Group not found: {}", group_id))
            })
    }

    /// Verify the user is a member of the group (owner-implicit).
    ///
    /// Fails NotFound for a missing group, Forbidden for a non-member.
    pub async fn verify_group_member(
        &self,
        auth: &AuthContext,
        group_id: &str,
    ) -> Result<(), ApiError> {
        self.require_group(group_id).await?;

        let is_member = membership::is_member(self.pool(), group_id, auth.user_id())
            .await
            .map_err(ApiError::from_sqlite)?;

        if !is_member {
            return Err(ApiError::forbidden(
                "NOT_A_MEMBER",
                "You must be a member of this group",
            ));
        }

        Ok(())
    }

    /// Verify the user owns the group
    pub async fn verify_group_owner(
        &self,
        auth: &AuthContext,
        group_id: &str,
    ) -> Result<GroupRow, ApiError> {
        let group = self.require_group(group_id).await?;

        if group.owner_id != auth.user_id() {
            return Err(ApiError::forbidden(
                "NOT_GROUP_OWNER",
                "Only the group owner may do this",
            ));
        }

        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{group as group_repo, membership, user};
    use crate::data::sqlite::{schema, test_pool};

    async fn make_service() -> AuthService {
        let pool = test_pool().await;
        for id in ["owner", "runner", "stranger"] {
            user::create_user(&pool, id, &format!("{}@example.com", id), None, "hash")
                .await
                .unwrap();
        }
        group_repo::create_group(&pool, "g1", "Crew", None, None, "owner")
            .await
            .unwrap();
        membership::join(&pool, "g1", "runner").await.unwrap();

        // Wrap the already-initialized pool in a service for the checks
        let service = SqliteService::from_pool(pool);
        AuthService::new(std::sync::Arc::new(service))
    }

    fn session(user_id: &str) -> AuthContext {
        AuthContext::Session {
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_member_check_includes_implicit_owner() {
        let service = make_service().await;

        assert!(service.verify_group_member(&session("owner"), "g1").await.is_ok());
        assert!(service.verify_group_member(&session("runner"), "g1").await.is_ok());

        let err = service
            .verify_group_member(&session("stranger"), "g1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_member_check_missing_group_is_not_found() {
        let service = make_service().await;
        let err = service
            .verify_group_member(&session("owner"), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_owner_check() {
        let service = make_service().await;

        assert!(service.verify_group_owner(&session("owner"), "g1").await.is_ok());

        // A plain member is not the owner
        let err = service
            .verify_group_owner(&session("runner"), "g1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_schema_seeds_are_present() {
        // The default group's owner passes the member check out of the box
        let service = make_service().await;
        assert!(schema::SCHEMA.contains("'default'"));
        assert!(service.verify_group_member(&session("local"), "default").await.is_ok());
    }
}
