//! User API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::auth::{Auth, password};
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::{group, user};

use types::{
    ChangePasswordRequest, UpdateUserRequest, UserDto, UserGroupDto, UserProfileResponse,
};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub database: Arc<SqliteService>,
}

/// Build Users API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = UsersApiState { database };

    Router::new()
        .route("/me", get(get_current_user).put(update_current_user))
        .route("/me/password", put(change_password))
        .with_state(state)
}

/// Get current user's profile with their groups
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "User profile with groups", body = UserProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_current_user(
    State(state): State<UsersApiState>,
    auth: Auth,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user_id = auth.user_id();
    let pool = state.database.pool();

    let found = user::get_user(pool, user_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    let groups = group::list_groups_for_user(pool, user_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(|g| UserGroupDto {
            is_owner: g.owner_id == user_id,
            id: g.id,
            name: g.name,
        })
        .collect();

    Ok(Json(UserProfileResponse {
        user: UserDto::from(found),
        groups,
    }))
}

/// Update current user's profile
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User profile updated", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_current_user(
    State(state): State<UsersApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let updated = user::update_user(
        state.database.pool(),
        auth.user_id(),
        body.display_name.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    Ok(Json(UserDto::from(updated)))
}

/// Change the current user's password.
///
/// Verifies the current credential before writing the new hash.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password incorrect"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_password(
    State(state): State<UsersApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pool = state.database.pool();

    let found = user::get_user(pool, auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    let stored = found.password_hash.as_deref().ok_or_else(|| {
        ApiError::bad_request(
            "NO_PASSWORD_SET",
            "This account has no password credential to change",
        )
    })?;

    if !password::verify_password(&body.current_password, stored) {
        return Err(ApiError::unauthorized(
            "INVALID_CREDENTIALS",
            "Current password is incorrect",
        ));
    }

    let new_hash = password::hash_password(&body.new_password);
    user::update_password_hash(pool, auth.user_id(), &new_hash)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::info!(user_id = %auth.user_id(), "Password changed");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password changed"
    })))
}
