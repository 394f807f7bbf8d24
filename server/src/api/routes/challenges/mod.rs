//! Challenge API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::{ValidatedJson, ValidatedQuery, is_valid_id};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::SqliteService;
use crate::data::sqlite::repositories::progress::ProgressJoinResult;
use crate::data::sqlite::repositories::{challenge, progress};
use crate::data::types::{ChallengeKind, ChallengeRow};
use crate::utils::time::{format_date, today};

use types::{
    ChallengeDto, CreateChallengeRequest, LeaderboardEntryDto, LeaderboardQuery,
    ListChallengesQuery, ProgressDto, UpdateChallengeRequest,
};

/// Shared state for Challenges API endpoints
#[derive(Clone)]
pub struct ChallengesApiState {
    pub database: Arc<SqliteService>,
}

/// Build Challenges API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = ChallengesApiState { database };

    Router::new()
        .route("/", get(list_challenges).post(create_challenge))
        .route(
            "/{challenge_id}",
            get(get_challenge)
                .put(update_challenge)
                .delete(delete_challenge),
        )
        .route("/{challenge_id}/join", post(join_challenge))
        .route("/{challenge_id}/leave", delete(leave_challenge))
        .route("/{challenge_id}/progress", get(get_progress))
        .route("/{challenge_id}/leaderboard", get(leaderboard))
        .with_state(state)
}

async fn require_challenge(
    state: &ChallengesApiState,
    challenge_id: &str,
) -> Result<ChallengeRow, ApiError> {
    if !is_valid_id(challenge_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid challenge id"));
    }

    challenge::get_challenge(state.database.pool(), challenge_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found(
                "CHALLENGE_NOT_FOUND",
                format!("Challenge not found: {}", challenge_id),
            )
        })
}

/// List public challenges
#[utoipa::path(
    get,
    path = "/api/v1/challenges",
    tag = "challenges",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "Public challenges, active first")
    )
)]
pub async fn list_challenges(
    State(state): State<ChallengesApiState>,
    _auth: Auth,
    ValidatedQuery(query): ValidatedQuery<ListChallengesQuery>,
) -> Result<Json<PaginatedResponse<ChallengeDto>>, ApiError> {
    let (challenges, total) =
        challenge::list_public(state.database.pool(), query.page, query.limit)
            .await
            .map_err(ApiError::from_sqlite)?;

    let data: Vec<ChallengeDto> = challenges.into_iter().map(ChallengeDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a challenge
#[utoipa::path(
    post,
    path = "/api/v1/challenges",
    tag = "challenges",
    request_body = CreateChallengeRequest,
    responses(
        (status = 201, description = "Challenge created", body = ChallengeDto),
        (status = 400, description = "Invalid kind or date range")
    )
)]
pub async fn create_challenge(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<ChallengeDto>), ApiError> {
    let kind = ChallengeKind::parse(&body.kind).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_KIND",
            "kind must be one of: daily_distance, total_distance, run_streak, custom",
        )
    })?;

    if body.end_date <= body.start_date {
        return Err(ApiError::bad_request(
            "INVALID_DATE_RANGE",
            "end_date must be after start_date",
        ));
    }

    // Distance-based kinds need the per-day requirement
    if matches!(
        kind,
        ChallengeKind::DailyDistance | ChallengeKind::TotalDistance
    ) && body.required_km_per_day.is_none()
    {
        return Err(ApiError::bad_request(
            "MISSING_REQUIRED_DISTANCE",
            "required_km_per_day is required for distance challenges",
        ));
    }

    let created = challenge::create_challenge(
        state.database.pool(),
        &cuid2::create_id(),
        &body.title,
        body.description.as_deref(),
        kind.as_str(),
        body.required_km_per_day,
        &format_date(body.start_date),
        &format_date(body.end_date),
        body.is_public,
        auth.user_id(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    tracing::info!(challenge_id = %created.id, kind = %kind, "Challenge created");

    Ok((StatusCode::CREATED, Json(ChallengeDto::from(created))))
}

/// Get a challenge
#[utoipa::path(
    get,
    path = "/api/v1/challenges/{challenge_id}",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    responses(
        (status = 200, description = "Challenge details", body = ChallengeDto),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn get_challenge(
    State(state): State<ChallengesApiState>,
    _auth: Auth,
    Path(challenge_id): Path<String>,
) -> Result<Json<ChallengeDto>, ApiError> {
    let found = require_challenge(&state, &challenge_id).await?;
    Ok(Json(ChallengeDto::from(found)))
}

/// Update a challenge (creator only)
#[utoipa::path(
    put,
    path = "/api/v1/challenges/{challenge_id}",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Challenge updated", body = ChallengeDto),
        (status = 403, description = "Only the creator may edit"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn update_challenge(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    Path(challenge_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateChallengeRequest>,
) -> Result<Json<ChallengeDto>, ApiError> {
    let found = require_challenge(&state, &challenge_id).await?;

    if found.created_by != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_CHALLENGE_CREATOR",
            "Only the challenge's creator may edit it",
        ));
    }

    let updated = challenge::update_challenge(
        state.database.pool(),
        &challenge_id,
        body.title.as_deref(),
        body.description.as_deref(),
        body.is_public,
        body.is_active,
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found(
            "CHALLENGE_NOT_FOUND",
            format!("Challenge not found: {}", challenge_id),
        )
    })?;

    Ok(Json(ChallengeDto::from(updated)))
}

/// Delete a challenge (creator only). Progress rows cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/challenges/{challenge_id}",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    responses(
        (status = 204, description = "Challenge deleted"),
        (status = 403, description = "Only the creator may delete"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn delete_challenge(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    Path(challenge_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let found = require_challenge(&state, &challenge_id).await?;

    if found.created_by != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_CHALLENGE_CREATOR",
            "Only the challenge's creator may delete it",
        ));
    }

    challenge::delete_challenge(state.database.pool(), &challenge_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    tracing::info!(challenge_id = %challenge_id, "Challenge deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Join a challenge.
///
/// Fails while the challenge is inactive or past its end date; a second
/// join is rejected by the storage-level uniqueness constraint.
#[utoipa::path(
    post,
    path = "/api/v1/challenges/{challenge_id}/join",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    responses(
        (status = 201, description = "Joined", body = ProgressDto),
        (status = 400, description = "Challenge inactive or ended, or already joined"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn join_challenge(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    Path(challenge_id): Path<String>,
) -> Result<(StatusCode, Json<ProgressDto>), ApiError> {
    let found = require_challenge(&state, &challenge_id).await?;

    if !found.is_active {
        return Err(ApiError::bad_request(
            "CHALLENGE_INACTIVE",
            "This challenge is no longer active",
        ));
    }
    if let Some(end) = crate::utils::time::parse_date(&found.end_date) {
        if today() > end {
            return Err(ApiError::bad_request(
                "CHALLENGE_ENDED",
                "This challenge has already ended",
            ));
        }
    }

    match progress::join(
        state.database.pool(),
        &cuid2::create_id(),
        &challenge_id,
        auth.user_id(),
    )
    .await
    .map_err(ApiError::from_sqlite)?
    {
        ProgressJoinResult::Joined(row) => {
            tracing::info!(challenge_id = %challenge_id, user_id = %auth.user_id(), "Joined challenge");
            Ok((StatusCode::CREATED, Json(ProgressDto::from(row))))
        }
        ProgressJoinResult::AlreadyJoined => Err(ApiError::bad_request(
            "ALREADY_JOINED",
            "You have already joined this challenge",
        )),
    }
}

/// Leave a challenge (removes only the requester's progress row)
#[utoipa::path(
    delete,
    path = "/api/v1/challenges/{challenge_id}/leave",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    responses(
        (status = 204, description = "Left the challenge"),
        (status = 404, description = "Not joined or challenge not found")
    )
)]
pub async fn leave_challenge(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    Path(challenge_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_challenge(&state, &challenge_id).await?;

    let left = progress::leave(state.database.pool(), &challenge_id, auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?;

    if !left {
        return Err(ApiError::not_found(
            "NOT_JOINED",
            "You have not joined this challenge",
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// The requesting user's progress in a challenge
#[utoipa::path(
    get,
    path = "/api/v1/challenges/{challenge_id}/progress",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID")
    ),
    responses(
        (status = 200, description = "Progress", body = ProgressDto),
        (status = 404, description = "Not joined or challenge not found")
    )
)]
pub async fn get_progress(
    State(state): State<ChallengesApiState>,
    auth: Auth,
    Path(challenge_id): Path<String>,
) -> Result<Json<ProgressDto>, ApiError> {
    require_challenge(&state, &challenge_id).await?;

    let row = progress::get_progress(state.database.pool(), &challenge_id, auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("NOT_JOINED", "You have not joined this challenge")
        })?;

    Ok(Json(ProgressDto::from(row)))
}

/// Challenge leaderboard.
///
/// Ordering: total distance desc, current streak desc, join time asc -
/// deterministic for equal values.
#[utoipa::path(
    get,
    path = "/api/v1/challenges/{challenge_id}/leaderboard",
    tag = "challenges",
    params(
        ("challenge_id" = String, Path, description = "Challenge ID"),
        ("top" = Option<u32>, Query, description = "Number of entries (1-100)")
    ),
    responses(
        (status = 200, description = "Ranked participants"),
        (status = 404, description = "Challenge not found")
    )
)]
pub async fn leaderboard(
    State(state): State<ChallengesApiState>,
    _auth: Auth,
    Path(challenge_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntryDto>>, ApiError> {
    require_challenge(&state, &challenge_id).await?;

    let entries = progress::leaderboard(state.database.pool(), &challenge_id, query.top)
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| LeaderboardEntryDto::from_entry(i as u32 + 1, entry))
        .collect();

    Ok(Json(entries))
}
