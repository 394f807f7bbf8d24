//! Shoe API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::{ValidatedJson, is_valid_id};
use crate::api::types::ApiError;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::shoe;
use crate::data::types::{ShoeRow, ShoeWithMileage};

use types::{CreateShoeRequest, ShoeDto, UpdateShoeRequest};

/// Shared state for Shoes API endpoints
#[derive(Clone)]
pub struct ShoesApiState {
    pub database: Arc<SqliteService>,
}

/// Build Shoes API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = ShoesApiState { database };

    Router::new()
        .route("/", get(list_shoes).post(create_shoe))
        .route(
            "/{shoe_id}",
            get(get_shoe).put(update_shoe).delete(delete_shoe),
        )
        .with_state(state)
}

/// Fetch a shoe owned by the requester, or fail
async fn require_own_shoe(
    state: &ShoesApiState,
    auth: &Auth,
    shoe_id: &str,
) -> Result<ShoeRow, ApiError> {
    if !is_valid_id(shoe_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid shoe id"));
    }

    let found = shoe::get_shoe(state.database.pool(), shoe_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("SHOE_NOT_FOUND", "Shoe not found"))?;

    if found.user_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_YOUR_SHOE",
            "Shoe belongs to another user",
        ));
    }

    Ok(found)
}

/// List the requesting user's shoes with derived mileage
#[utoipa::path(
    get,
    path = "/api/v1/shoes",
    tag = "shoes",
    responses(
        (status = 200, description = "Shoes with derived mileage")
    )
)]
pub async fn list_shoes(
    State(state): State<ShoesApiState>,
    auth: Auth,
) -> Result<Json<Vec<ShoeDto>>, ApiError> {
    let shoes = shoe::list_for_user(state.database.pool(), auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?
        .into_iter()
        .map(ShoeDto::from)
        .collect();

    Ok(Json(shoes))
}

/// Add a shoe
#[utoipa::path(
    post,
    path = "/api/v1/shoes",
    tag = "shoes",
    request_body = CreateShoeRequest,
    responses(
        (status = 201, description = "Shoe added", body = ShoeDto)
    )
)]
pub async fn create_shoe(
    State(state): State<ShoesApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateShoeRequest>,
) -> Result<(StatusCode, Json<ShoeDto>), ApiError> {
    let created = shoe::create_shoe(
        state.database.pool(),
        &cuid2::create_id(),
        auth.user_id(),
        &body.name,
        body.brand.as_deref(),
        body.base_distance_km,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let total_distance_km = created.base_distance_km;
    Ok((
        StatusCode::CREATED,
        Json(ShoeDto::from(ShoeWithMileage {
            shoe: created,
            total_distance_km,
        })),
    ))
}

/// Get one shoe with derived mileage
#[utoipa::path(
    get,
    path = "/api/v1/shoes/{shoe_id}",
    tag = "shoes",
    params(
        ("shoe_id" = String, Path, description = "Shoe ID")
    ),
    responses(
        (status = 200, description = "Shoe with derived mileage", body = ShoeDto),
        (status = 403, description = "Not your shoe"),
        (status = 404, description = "Shoe not found")
    )
)]
pub async fn get_shoe(
    State(state): State<ShoesApiState>,
    auth: Auth,
    Path(shoe_id): Path<String>,
) -> Result<Json<ShoeDto>, ApiError> {
    let found = require_own_shoe(&state, &auth, &shoe_id).await?;

    let total_distance_km = shoe::mileage(state.database.pool(), &shoe_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .unwrap_or(found.base_distance_km);

    Ok(Json(ShoeDto::from(ShoeWithMileage {
        shoe: found,
        total_distance_km,
    })))
}

/// Update a shoe (rename, set brand, retire)
#[utoipa::path(
    put,
    path = "/api/v1/shoes/{shoe_id}",
    tag = "shoes",
    params(
        ("shoe_id" = String, Path, description = "Shoe ID")
    ),
    request_body = UpdateShoeRequest,
    responses(
        (status = 200, description = "Shoe updated", body = ShoeDto),
        (status = 403, description = "Not your shoe"),
        (status = 404, description = "Shoe not found")
    )
)]
pub async fn update_shoe(
    State(state): State<ShoesApiState>,
    auth: Auth,
    Path(shoe_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateShoeRequest>,
) -> Result<Json<ShoeDto>, ApiError> {
    require_own_shoe(&state, &auth, &shoe_id).await?;

    let pool = state.database.pool();
    let updated = shoe::update_shoe(
        pool,
        &shoe_id,
        body.name.as_deref(),
        body.brand.as_deref(),
        body.retired,
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| ApiError::not_found("SHOE_NOT_FOUND", "Shoe not found"))?;

    let total_distance_km = shoe::mileage(pool, &shoe_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .unwrap_or(updated.base_distance_km);

    Ok(Json(ShoeDto::from(ShoeWithMileage {
        shoe: updated,
        total_distance_km,
    })))
}

/// Delete a shoe. Logged runs keep their rows with the shoe detached.
#[utoipa::path(
    delete,
    path = "/api/v1/shoes/{shoe_id}",
    tag = "shoes",
    params(
        ("shoe_id" = String, Path, description = "Shoe ID")
    ),
    responses(
        (status = 204, description = "Shoe deleted"),
        (status = 403, description = "Not your shoe"),
        (status = 404, description = "Shoe not found")
    )
)]
pub async fn delete_shoe(
    State(state): State<ShoesApiState>,
    auth: Auth,
    Path(shoe_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_own_shoe(&state, &auth, &shoe_id).await?;

    shoe::delete_shoe(state.database.pool(), &shoe_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    Ok(StatusCode::NO_CONTENT)
}
