//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    activities, auth, challenges, chat, groups, health, runs, shoes, uploads, users,
};
use crate::api::types::PaginationMeta;
use crate::data::types::{AttendanceStatus, ChallengeKind, UploadKind};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PaceCrew API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Self-hosted social running-group server"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login, sessions"),
        (name = "users", description = "User profile"),
        (name = "groups", description = "Groups and membership"),
        (name = "runs", description = "Scheduled group runs"),
        (name = "attendance", description = "Run RSVPs"),
        (name = "comments", description = "Run comments"),
        (name = "activities", description = "Individual run log"),
        (name = "shoes", description = "Shoe mileage tracking"),
        (name = "challenges", description = "Distance and streak challenges"),
        (name = "chat", description = "Real-time group chat"),
        (name = "uploads", description = "Image uploads")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::register,
        auth::login,
        auth::auth_status,
        auth::logout,
        // Users
        users::get_current_user,
        users::update_current_user,
        users::change_password,
        // Groups
        groups::list_groups,
        groups::create_group,
        groups::get_group,
        groups::update_group,
        groups::delete_group,
        groups::list_members,
        groups::join_group,
        groups::leave_group,
        // Runs
        runs::list_runs,
        runs::create_run,
        runs::get_run,
        runs::update_run,
        runs::delete_run,
        runs::set_attendance,
        runs::list_attendance,
        runs::delete_attendance,
        runs::list_comments,
        runs::create_comment,
        runs::delete_comment,
        // Activities
        activities::list_activities,
        activities::create_activity,
        activities::get_activity,
        activities::delete_activity,
        // Shoes
        shoes::list_shoes,
        shoes::create_shoe,
        shoes::get_shoe,
        shoes::update_shoe,
        shoes::delete_shoe,
        // Challenges
        challenges::list_challenges,
        challenges::create_challenge,
        challenges::get_challenge,
        challenges::update_challenge,
        challenges::delete_challenge,
        challenges::join_challenge,
        challenges::leave_challenge,
        challenges::get_progress,
        challenges::leaderboard,
        // Chat
        chat::list_messages,
        chat::send_message,
        chat::delete_message,
        chat::typing,
        chat::events,
        // Uploads
        uploads::upload_image,
    ),
    components(schemas(PaginationMeta, AttendanceStatus, ChallengeKind, UploadKind))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serve a minimal Swagger UI page pointed at the OpenAPI document
pub async fn swagger_ui_html() -> impl IntoResponse {
    const HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>PaceCrew API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({ url: "/api/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>"##;

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], Html(HTML))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.is_empty());
        assert!(doc.paths.paths.contains_key("/api/v1/health"));
        assert!(doc.paths.paths.contains_key("/api/v1/groups"));
        assert!(
            doc.paths
                .paths
                .contains_key("/api/v1/challenges/{challenge_id}/leaderboard")
        );
    }
}
