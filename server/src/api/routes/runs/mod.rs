//! Scheduled run, attendance and comment API endpoints
//!
//! Authorization is asymmetric by design: only the group owner creates a
//! run, but only the run's author may edit or delete it afterwards.
//! Attendance and comments require membership of the run's group
//! (owner-implicit).

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::auth::{Auth, AuthService, GroupMember, GroupOwner};
use crate::api::extractors::{ValidatedJson, ValidatedQuery, is_valid_id};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::SqliteService;
use crate::data::sqlite::repositories::{attendance, comment, run};
use crate::data::types::{AttendanceStatus, ScheduledRunRow};

use types::{
    AttendanceDto, AttendanceListResponse, CommentDto, CreateCommentRequest, CreateRunRequest,
    ListRunsQuery, RunDto, SetAttendanceRequest, UpdateRunRequest,
};

/// Shared state for Runs API endpoints
#[derive(Clone)]
pub struct RunsApiState {
    pub database: Arc<SqliteService>,
}

/// Routes nested under /groups/{group_id}/runs
pub fn group_routes(database: Arc<SqliteService>) -> Router<()> {
    let state = RunsApiState { database };

    Router::new()
        .route("/", get(list_runs).post(create_run))
        .with_state(state)
}

/// Routes nested under /runs, /attendance and /comments
pub fn run_routes(database: Arc<SqliteService>) -> Router<()> {
    let state = RunsApiState { database };

    Router::new()
        .route(
            "/runs/{run_id}",
            get(get_run).put(update_run).delete(delete_run),
        )
        .route(
            "/runs/{run_id}/attendance",
            get(list_attendance).put(set_attendance),
        )
        .route("/runs/{run_id}/comments", get(list_comments).post(create_comment))
        .route("/attendance/{attendance_id}", delete(delete_attendance))
        .route("/comments/{comment_id}", delete(delete_comment))
        .with_state(state)
}

/// Fetch a run and verify the requester is a member of its group
async fn require_run_member(
    state: &RunsApiState,
    auth_service: &AuthService,
    auth: &crate::api::auth::AuthContext,
    run_id: &str,
) -> Result<ScheduledRunRow, ApiError> {
    if !is_valid_id(run_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid run id"));
    }

    let found = run::get_run(state.database.pool(), run_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("RUN_NOT_FOUND", format!("Run not found: {}", run_id))
        })?;

    auth_service.verify_group_member(auth, &found.group_id).await?;
    Ok(found)
}

fn auth_service_from(state: &RunsApiState) -> AuthService {
    AuthService::new(state.database.clone())
}

/// List scheduled runs for a group (members only)
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/runs",
    tag = "runs",
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "List of scheduled runs"),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn list_runs(
    State(state): State<RunsApiState>,
    auth: GroupMember,
    ValidatedQuery(query): ValidatedQuery<ListRunsQuery>,
) -> Result<Json<PaginatedResponse<RunDto>>, ApiError> {
    let (runs, total) = run::list_runs_for_group(
        state.database.pool(),
        &auth.group_id,
        query.page,
        query.limit,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<RunDto> = runs.into_iter().map(RunDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Schedule a run (group owner only)
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/runs",
    tag = "runs",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Run scheduled", body = RunDto),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Only the group owner may schedule runs")
    )
)]
pub async fn create_run(
    State(state): State<RunsApiState>,
    auth: GroupOwner,
    ValidatedJson(body): ValidatedJson<CreateRunRequest>,
) -> Result<(StatusCode, Json<RunDto>), ApiError> {
    let run_id = cuid2::create_id();

    let created = run::create_run(
        state.database.pool(),
        &run_id,
        &auth.group_id,
        auth.auth.user_id(),
        &body.title,
        body.starts_at.map(|t| t.timestamp()),
        body.location.as_deref(),
        body.pace.as_deref(),
        body.distance_km,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    tracing::info!(run_id = %created.id, group_id = %auth.group_id, "Run scheduled");

    Ok((StatusCode::CREATED, Json(RunDto::from(created))))
}

/// Get a scheduled run (members of its group only)
#[utoipa::path(
    get,
    path = "/api/v1/runs/{run_id}",
    tag = "runs",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Run details", body = RunDto),
        (status = 403, description = "Not a member of the run's group"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
) -> Result<Json<RunDto>, ApiError> {
    let service = auth_service_from(&state);
    let found = require_run_member(&state, &service, &auth.ctx, &run_id).await?;
    Ok(Json(RunDto::from(found)))
}

/// Update a scheduled run (author only - not the group owner, unless they
/// authored it)
#[utoipa::path(
    put,
    path = "/api/v1/runs/{run_id}",
    tag = "runs",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    request_body = UpdateRunRequest,
    responses(
        (status = 200, description = "Run updated", body = RunDto),
        (status = 403, description = "Only the author may edit this run"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn update_run(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateRunRequest>,
) -> Result<Json<RunDto>, ApiError> {
    let service = auth_service_from(&state);
    let found = require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    if found.author_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_RUN_AUTHOR",
            "Only the run's author may edit it",
        ));
    }

    let updated = run::update_run(
        state.database.pool(),
        &run_id,
        body.title.as_deref(),
        body.starts_at.map(|t| t.timestamp()),
        body.location.as_deref(),
        body.pace.as_deref(),
        body.distance_km,
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| ApiError::not_found("RUN_NOT_FOUND", format!("Run not found: {}", run_id)))?;

    Ok(Json(RunDto::from(updated)))
}

/// Delete a scheduled run (author only). Attendance and comments cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/runs/{run_id}",
    tag = "runs",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 204, description = "Run deleted"),
        (status = 403, description = "Only the author may delete this run"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn delete_run(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = auth_service_from(&state);
    let found = require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    if found.author_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_RUN_AUTHOR",
            "Only the run's author may delete it",
        ));
    }

    run::delete_run(state.database.pool(), &run_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::info!(run_id = %run_id, "Run deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Set the requesting user's RSVP for a run (members only, idempotent
/// upsert - one row per user per run)
#[utoipa::path(
    put,
    path = "/api/v1/runs/{run_id}/attendance",
    tag = "attendance",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    request_body = SetAttendanceRequest,
    responses(
        (status = 200, description = "RSVP recorded", body = AttendanceDto),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Must be a member to attend"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn set_attendance(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
    ValidatedJson(body): ValidatedJson<SetAttendanceRequest>,
) -> Result<Json<AttendanceDto>, ApiError> {
    let status = AttendanceStatus::parse(&body.status).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_STATUS",
            "invalid status: must be one of going, maybe, not_going",
        )
    })?;

    let service = auth_service_from(&state);
    require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    let row = attendance::set_attendance(
        state.database.pool(),
        &cuid2::create_id(),
        &run_id,
        auth.user_id(),
        status,
        body.notes.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    Ok(Json(AttendanceDto::from(row)))
}

/// Attendance summary and RSVPs for a run (members only).
///
/// Counts are aggregated from the rows on every request.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{run_id}/attendance",
    tag = "attendance",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Attendance summary", body = AttendanceListResponse),
        (status = 403, description = "Not a member of the run's group"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn list_attendance(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
) -> Result<Json<AttendanceListResponse>, ApiError> {
    let service = auth_service_from(&state);
    require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    let pool = state.database.pool();
    let summary = attendance::summarize(pool, &run_id)
        .await
        .map_err(ApiError::from_sqlite)?;
    let rsvps = attendance::list_for_run(pool, &run_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(AttendanceDto::from)
        .collect();

    Ok(Json(AttendanceListResponse::new(summary, rsvps)))
}

/// Withdraw an RSVP (self-service only; no owner override)
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{attendance_id}",
    tag = "attendance",
    params(
        ("attendance_id" = String, Path, description = "Attendance ID")
    ),
    responses(
        (status = 204, description = "RSVP withdrawn"),
        (status = 403, description = "Not your RSVP"),
        (status = 404, description = "RSVP not found")
    )
)]
pub async fn delete_attendance(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(attendance_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&attendance_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid attendance id"));
    }

    let pool = state.database.pool();
    let found = attendance::get_attendance(pool, &attendance_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("ATTENDANCE_NOT_FOUND", "RSVP not found"))?;

    if found.user_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_YOUR_RSVP",
            "Only the RSVP's owner may withdraw it",
        ));
    }

    attendance::delete_attendance(pool, &attendance_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(StatusCode::NO_CONTENT)
}

/// List comments on a run (members only)
#[utoipa::path(
    get,
    path = "/api/v1/runs/{run_id}/comments",
    tag = "comments",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    responses(
        (status = 200, description = "Comments in chronological order"),
        (status = 403, description = "Not a member of the run's group"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn list_comments(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
) -> Result<Json<Vec<CommentDto>>, ApiError> {
    let service = auth_service_from(&state);
    require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    let comments = comment::list_for_run(state.database.pool(), &run_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(CommentDto::from)
        .collect();

    Ok(Json(comments))
}

/// Comment on a run (members only)
#[utoipa::path(
    post,
    path = "/api/v1/runs/{run_id}/comments",
    tag = "comments",
    params(
        ("run_id" = String, Path, description = "Run ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 403, description = "Not a member of the run's group"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn create_comment(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(run_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>), ApiError> {
    let service = auth_service_from(&state);
    require_run_member(&state, &service, &auth.ctx, &run_id).await?;

    let created = comment::create_comment(
        state.database.pool(),
        &cuid2::create_id(),
        &run_id,
        auth.user_id(),
        &body.body,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let author_name = crate::data::sqlite::repositories::user::get_user(
        state.database.pool(),
        auth.user_id(),
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .and_then(|u| u.display_name);

    Ok((
        StatusCode::CREATED,
        Json(CommentDto {
            id: created.id,
            run_id: created.run_id,
            author_id: created.author_id,
            author_name,
            body: created.body,
            created_at: crate::utils::time::ts_to_datetime(created.created_at),
        }),
    ))
}

/// Delete a comment (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{comment_id}",
    tag = "comments",
    params(
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Only the author may delete this comment"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<RunsApiState>,
    auth: Auth,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&comment_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid comment id"));
    }

    let pool = state.database.pool();
    let found = comment::get_comment(pool, &comment_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("COMMENT_NOT_FOUND", "Comment not found"))?;

    if found.author_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_COMMENT_AUTHOR",
            "Only the comment's author may delete it",
        ));
    }

    comment::delete_comment(pool, &comment_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(StatusCode::NO_CONTENT)
}
