//! Authorization extractors for Axum handlers
//!
//! These extractors combine authentication (from middleware) with
//! authorization (membership and ownership checks) into a single
//! extraction step.
//!
//! # Usage
//!
//! ```no_run
//! # use pacecrew_server::api::auth::GroupMember;
//! # use pacecrew_server::api::types::ApiError;
//! pub async fn list_runs(auth: GroupMember) -> Result<(), ApiError> {
//!     // auth.group_id - validated group ID from path
//!     // auth.auth - AuthContext for the requesting user
//!     Ok(())
//! }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use super::context::{AuthContext, AuthService};
use crate::api::extractors::{ValidationRejection, is_valid_id};
use crate::api::types::ApiError;

// ============================================================================
// Role Markers
// ============================================================================

/// Marker trait for group access requirements
pub trait GroupRole: Send + Sync + 'static {
    /// Run the check against the auth service
    fn verify(
        service: &AuthService,
        auth: &AuthContext,
        group_id: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

/// Member access marker (owner-implicit membership)
pub struct Member;
impl GroupRole for Member {
    async fn verify(
        service: &AuthService,
        auth: &AuthContext,
        group_id: &str,
    ) -> Result<(), ApiError> {
        service.verify_group_member(auth, group_id).await
    }
}

/// Owner access marker
pub struct Owner;
impl GroupRole for Owner {
    async fn verify(
        service: &AuthService,
        auth: &AuthContext,
        group_id: &str,
    ) -> Result<(), ApiError> {
        service.verify_group_owner(auth, group_id).await.map(|_| ())
    }
}

// ============================================================================
// Auth Rejection
// ============================================================================

/// Rejection type for auth extractors
pub enum AuthRejection {
    /// Path extraction or validation failed
    Path(ValidationRejection),
    /// Authorization failed
    Auth(ApiError),
    /// Auth context not available (middleware not applied)
    MissingContext,
}

impl From<ValidationRejection> for AuthRejection {
    fn from(v: ValidationRejection) -> Self {
        Self::Path(v)
    }
}

impl From<ApiError> for AuthRejection {
    fn from(e: ApiError) -> Self {
        Self::Auth(e)
    }
}

impl axum::response::IntoResponse for AuthRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Path(v) => v.into_response(),
            Self::Auth(e) => e.into_response(),
            Self::MissingContext => {
                ApiError::internal("Auth context not available").into_response()
            }
        }
    }
}

/// Extract auth context and service from request extensions
fn extract_auth(parts: &Parts) -> Result<(AuthContext, Arc<AuthService>), AuthRejection> {
    let auth = parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)?;

    let auth_service = parts
        .extensions
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or(AuthRejection::MissingContext)?;

    Ok((auth, auth_service))
}

// ============================================================================
// Group Access Extractors
// ============================================================================

/// Verified group access with a parameterized role requirement.
///
/// Extracts `group_id` from the path, verifies authentication and the role
/// check in one step.
pub struct GroupAccess<Role: GroupRole = Member> {
    /// The validated group ID from the path
    pub group_id: String,
    /// The authentication context
    pub auth: AuthContext,
    _role: PhantomData<Role>,
}

/// Type alias for member-level group access
pub type GroupMember = GroupAccess<Member>;

/// Type alias for owner-level group access
pub type GroupOwner = GroupAccess<Owner>;

#[derive(Deserialize)]
struct GroupParams {
    group_id: String,
}

impl<S, Role> FromRequestParts<S> for GroupAccess<Role>
where
    S: Send + Sync,
    Role: GroupRole,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<GroupParams>::from_request_parts(parts, _state)
            .await
            .map_err(|e| AuthRejection::Path(ValidationRejection::Path(e)))?;

        if !is_valid_id(&params.group_id) {
            return Err(AuthRejection::Path(ValidationRejection::InvalidId));
        }

        let (auth, auth_service) = extract_auth(parts)?;
        Role::verify(&auth_service, &auth, &params.group_id).await?;

        Ok(Self {
            group_id: params.group_id,
            auth,
            _role: PhantomData,
        })
    }
}

// ============================================================================
// Simple Auth Extractor (no path parameters)
// ============================================================================

/// Simple authenticated context extractor.
///
/// Use for routes that need authentication but don't carry a group ID in
/// the path (profile, activities, challenges).
pub struct Auth {
    pub ctx: AuthContext,
}

impl Auth {
    /// The authenticated user's ID
    pub fn user_id(&self) -> &str {
        self.ctx.user_id()
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthRejection::MissingContext)?;

        Ok(Self { ctx })
    }
}
