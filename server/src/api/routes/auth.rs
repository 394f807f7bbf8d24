//! Authentication API endpoints
//!
//! Registration and login with PBKDF2-hashed credentials and JWT session
//! cookies. There is no plaintext credential handling anywhere.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::{AuthManager, password};
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::core::constants::{MIN_PASSWORD_LEN, SESSION_COOKIE_NAME};
use crate::data::SqliteService;
use crate::data::sqlite::repositories::user;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Display name must be at most 100 characters"))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// User info in auth responses
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUserDto {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserDto>,
}

/// Auth state with database access
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub database: Arc<SqliteService>,
}

/// Create auth routes
pub fn routes(auth_manager: Arc<AuthManager>, database: Arc<SqliteService>) -> Router {
    let state = AuthRoutesState {
        auth_manager,
        database,
    };

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/status", get(auth_status))
        .with_state(state)
}

fn session_cookie(jwt: String, ttl_days: u32) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, jwt))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/api")
        .max_age(time::Duration::days(ttl_days as i64))
        .build()
}

/// Register a new account and start a session
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionUserDto),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, (StatusCode, Json<SessionUserDto>)), ApiError> {
    // The validator covers the derive-level length; keep the constant as
    // the single source of truth for the policy.
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "PASSWORD_TOO_SHORT",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    let email = body.email.trim().to_lowercase();
    let hash = password::hash_password(&body.password);
    let user_id = cuid2::create_id();

    let created = user::create_user(
        state.database.pool(),
        &user_id,
        &email,
        body.display_name.as_deref(),
        &hash,
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::conflict("EMAIL_EXISTS", "An account with this email already exists")
        } else {
            ApiError::from_sqlite(e)
        }
    })?;

    let jwt = state
        .auth_manager
        .create_session(&created.id)
        .map_err(|e| ApiError::internal(format!("Failed to create session: {}", e)))?;

    tracing::info!(user_id = %created.id, "Account registered");

    Ok((
        jar.add(session_cookie(jwt, state.auth_manager.session_ttl_days())),
        (
            StatusCode::CREATED,
            Json(SessionUserDto {
                id: created.id,
                email: created.email,
                display_name: created.display_name,
            }),
        ),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionUserDto),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionUserDto>), ApiError> {
    let email = body.email.trim().to_lowercase();

    let found = user::get_user_by_email(state.database.pool(), &email)
        .await
        .map_err(ApiError::from_sqlite)?;

    // One error for both unknown email and bad password
    let invalid =
        || ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password");

    let found = found.ok_or_else(invalid)?;
    let stored = found.password_hash.as_deref().ok_or_else(invalid)?;

    if !password::verify_password(&body.password, stored) {
        return Err(invalid());
    }

    let jwt = state
        .auth_manager
        .create_session(&found.id)
        .map_err(|e| ApiError::internal(format!("Failed to create session: {}", e)))?;

    Ok((
        jar.add(session_cookie(jwt, state.auth_manager.session_ttl_days())),
        Json(SessionUserDto {
            id: found.id,
            email: found.email,
            display_name: found.display_name,
        }),
    ))
}

/// Check authentication status (returns user profile when authenticated)
#[utoipa::path(
    get,
    path = "/api/v1/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> Json<AuthStatusResponse> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Auth disabled: report the default local user
    if !state.auth_manager.is_enabled() {
        let user = user::get_user(state.database.pool(), crate::core::constants::DEFAULT_USER_ID)
            .await
            .ok()
            .flatten()
            .map(|u| SessionUserDto {
                id: u.id,
                email: u.email,
                display_name: u.display_name,
            });

        return Json(AuthStatusResponse {
            authenticated: true,
            version: VERSION,
            user,
        });
    }

    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return Json(AuthStatusResponse {
            authenticated: false,
            version: VERSION,
            user: None,
        });
    };

    match state.auth_manager.validate_session(cookie.value()) {
        Ok(claims) => {
            let user = user::get_user(state.database.pool(), claims.user_id())
                .await
                .ok()
                .flatten()
                .map(|u| SessionUserDto {
                    id: u.id,
                    email: u.email,
                    display_name: u.display_name,
                });

            Json(AuthStatusResponse {
                authenticated: user.is_some(),
                version: VERSION,
                user,
            })
        }
        Err(_) => Json(AuthStatusResponse {
            authenticated: false,
            version: VERSION,
            user: None,
        }),
    }
}

/// Logout - clear session cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out successfully")
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/api")
        .max_age(time::Duration::seconds(0))
        .build();

    (
        jar.remove(cookie),
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out successfully"
        })),
    )
}
