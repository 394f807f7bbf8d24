//! Activity (run log) API endpoints
//!
//! Logging a run is the entry point for challenge progress: the new
//! distance is applied to every joined, active challenge whose window
//! covers the run date. Each challenge updates in its own transaction; a
//! failure on one challenge does not undo the activity or the others.

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::{ValidatedJson, ValidatedQuery, is_valid_id};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::SqliteService;
use crate::data::sqlite::repositories::{activity, challenge, progress, shoe};
use crate::domain::progress::in_window;
use crate::utils::time::format_date;

use types::{ActivityDto, CreateActivityRequest, CreateActivityResponse, ListActivitiesQuery};

/// Shared state for Activities API endpoints
#[derive(Clone)]
pub struct ActivitiesApiState {
    pub database: Arc<SqliteService>,
}

/// Build Activities API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = ActivitiesApiState { database };

    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/{activity_id}", get(get_activity).delete(delete_activity))
        .with_state(state)
}

/// List the requesting user's logged runs
#[utoipa::path(
    get,
    path = "/api/v1/activities",
    tag = "activities",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "Logged runs, most recent first")
    )
)]
pub async fn list_activities(
    State(state): State<ActivitiesApiState>,
    auth: Auth,
    ValidatedQuery(query): ValidatedQuery<ListActivitiesQuery>,
) -> Result<Json<PaginatedResponse<ActivityDto>>, ApiError> {
    let (activities, total) = activity::list_for_user(
        state.database.pool(),
        auth.user_id(),
        query.page,
        query.limit,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<ActivityDto> = activities.into_iter().map(ActivityDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Log a run and advance challenge progress
#[utoipa::path(
    post,
    path = "/api/v1/activities",
    tag = "activities",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Run logged", body = CreateActivityResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Referenced shoe not found")
    )
)]
pub async fn create_activity(
    State(state): State<ActivitiesApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<CreateActivityResponse>), ApiError> {
    let pool = state.database.pool();
    let user_id = auth.user_id();

    // Referenced shoe must exist and belong to the user
    if let Some(shoe_id) = body.shoe_id.as_deref() {
        let found = shoe::get_shoe(pool, shoe_id)
            .await
            .map_err(ApiError::from_sqlite)?
            .ok_or_else(|| ApiError::not_found("SHOE_NOT_FOUND", "Shoe not found"))?;
        if found.user_id != user_id {
            return Err(ApiError::forbidden("NOT_YOUR_SHOE", "Shoe belongs to another user"));
        }
    }

    let run_date = format_date(body.run_date);
    let created = activity::create_activity(
        pool,
        &cuid2::create_id(),
        user_id,
        body.shoe_id.as_deref(),
        body.title.as_deref(),
        body.distance_km,
        body.duration_secs,
        &run_date,
        body.notes.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    // Fan out to joined, active challenges whose window covers the run date
    let mut challenges_advanced = Vec::new();
    let joined = challenge::list_joined_active(pool, user_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    for ch in joined {
        if !in_window(&ch, body.run_date) {
            continue;
        }
        match progress::record_run(pool, &ch, user_id, body.run_date, body.distance_km).await {
            Ok(Some(_)) => challenges_advanced.push(ch.id),
            Ok(None) => {}
            Err(e) => {
                // The activity stands; log and continue with the rest
                tracing::error!(challenge_id = %ch.id, error = %e, "Failed to record challenge progress");
            }
        }
    }

    tracing::info!(
        activity_id = %created.id,
        user_id = %user_id,
        challenges = challenges_advanced.len(),
        "Run logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateActivityResponse {
            activity: ActivityDto::from(created),
            challenges_advanced,
        }),
    ))
}

/// Get one logged run (self only)
#[utoipa::path(
    get,
    path = "/api/v1/activities/{activity_id}",
    tag = "activities",
    params(
        ("activity_id" = String, Path, description = "Activity ID")
    ),
    responses(
        (status = 200, description = "Logged run", body = ActivityDto),
        (status = 403, description = "Not your activity"),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn get_activity(
    State(state): State<ActivitiesApiState>,
    auth: Auth,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityDto>, ApiError> {
    if !is_valid_id(&activity_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid activity id"));
    }

    let found = activity::get_activity(state.database.pool(), &activity_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("ACTIVITY_NOT_FOUND", "Activity not found"))?;

    if found.user_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_YOUR_ACTIVITY",
            "Activity belongs to another user",
        ));
    }

    Ok(Json(ActivityDto::from(found)))
}

/// Delete a logged run (self only).
///
/// Challenge counters are not rewound; progress reflects what was logged
/// while the row existed.
#[utoipa::path(
    delete,
    path = "/api/v1/activities/{activity_id}",
    tag = "activities",
    params(
        ("activity_id" = String, Path, description = "Activity ID")
    ),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 403, description = "Not your activity"),
        (status = 404, description = "Activity not found")
    )
)]
pub async fn delete_activity(
    State(state): State<ActivitiesApiState>,
    auth: Auth,
    Path(activity_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&activity_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid activity id"));
    }

    let pool = state.database.pool();
    let found = activity::get_activity(pool, &activity_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("ACTIVITY_NOT_FOUND", "Activity not found"))?;

    if found.user_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_YOUR_ACTIVITY",
            "Activity belongs to another user",
        ));
    }

    activity::delete_activity(pool, &activity_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(StatusCode::NO_CONTENT)
}
