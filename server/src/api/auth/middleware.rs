//! Authentication middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::context::{AuthContext, AuthService};
use super::jwt::JwtError;
use super::manager::AuthManager;
use crate::api::middleware::AllowedOrigins;
use crate::core::constants::{DEFAULT_USER_ID, SESSION_COOKIE_NAME};
use crate::data::SqliteService;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_EXPIRED",
            message: "Session has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_INVALID",
            message: "Invalid session token".to_string(),
        }
    }

    pub fn origin_not_allowed() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "ORIGIN_NOT_ALLOWED",
            message: "Request origin not allowed".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub allowed_origins: AllowedOrigins,
    pub database: Arc<SqliteService>,
}

/// Authentication middleware
///
/// Injects into request extensions:
/// - `AuthContext` - the authenticated identity
/// - `Arc<AuthService>` - authorization service for extractors
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_service = Arc::new(AuthService::new(state.database.clone()));
    request.extensions_mut().insert(auth_service);

    if !state.auth_manager.is_enabled() {
        // Auth disabled: every request acts as the seeded local user
        let auth_ctx = AuthContext::LocalDefault {
            user_id: DEFAULT_USER_ID.to_string(),
        };
        request.extensions_mut().insert(auth_ctx);

        return Ok(next.run(request).await);
    }

    // Validate Origin header for CSRF protection
    if let Some(origin) = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
    {
        if !state.allowed_origins.is_allowed(origin) {
            tracing::warn!("Rejected request from disallowed origin: {}", origin);
            return Err(AuthError::origin_not_allowed());
        }
    }

    let session_cookie = jar
        .get(SESSION_COOKIE_NAME)
        .ok_or_else(AuthError::required)?;
    let jwt = session_cookie.value();

    let claims = state
        .auth_manager
        .validate_session(jwt)
        .map_err(|e| match e {
            JwtError::Expired => AuthError::expired(),
            _ => AuthError::invalid(),
        })?;

    let auth_ctx = AuthContext::Session {
        user_id: claims.user_id().to_string(),
    };
    request.extensions_mut().insert(auth_ctx);

    Ok(next.run(request).await)
}
