//! Group API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::auth::{Auth, GroupMember, GroupOwner};
use crate::api::extractors::{ValidatedJson, ValidatedQuery, is_valid_id};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::SqliteService;
use crate::data::sqlite::repositories::membership::{JoinResult, LeaveResult};
use crate::data::sqlite::repositories::{group, membership};

use types::{
    CreateGroupRequest, GroupDto, GroupSummaryDto, ListGroupsQuery, ListMembersQuery, MemberDto,
    UpdateGroupRequest,
};

/// Shared state for Groups API endpoints
#[derive(Clone)]
pub struct GroupsApiState {
    pub database: Arc<SqliteService>,
}

/// Build Groups API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    let state = GroupsApiState { database };

    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route(
            "/{group_id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/{group_id}/members", get(list_members).post(join_group))
        .route("/{group_id}/members/me", delete(leave_group))
        .with_state(state)
}

/// List all groups with derived member counts
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "List of groups with pagination metadata")
    )
)]
pub async fn list_groups(
    State(state): State<GroupsApiState>,
    _auth: Auth,
    ValidatedQuery(query): ValidatedQuery<ListGroupsQuery>,
) -> Result<Json<PaginatedResponse<GroupSummaryDto>>, ApiError> {
    let (groups, total) = group::list_groups(state.database.pool(), query.page, query.limit)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<GroupSummaryDto> = groups.into_iter().map(GroupSummaryDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a new group (requesting user becomes the owner)
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupDto),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_group(
    State(state): State<GroupsApiState>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDto>), ApiError> {
    let group_id = cuid2::create_id();

    let created = group::create_group(
        state.database.pool(),
        &group_id,
        &body.name,
        body.description.as_deref(),
        body.location.as_deref(),
        auth.user_id(),
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    tracing::info!(group_id = %created.id, owner_id = %created.owner_id, "Group created");

    Ok((StatusCode::CREATED, Json(GroupDto::from(created))))
}

/// Get a single group by ID
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group details", body = GroupDto),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_group(
    State(state): State<GroupsApiState>,
    _auth: Auth,
    Path(group_id): Path<String>,
) -> Result<Json<GroupDto>, ApiError> {
    if !is_valid_id(&group_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid group id"));
    }

    let found = group::get_group(state.database.pool(), &group_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| {
            ApiError::not_found("GROUP_NOT_FOUND", format!("Group not found: {}", group_id))
        })?;

    Ok(Json(GroupDto::from(found)))
}

/// Update a group (owner only)
#[utoipa::path(
    put,
    path = "/api/v1/groups/{group_id}",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupDto),
        (status = 403, description = "Not the group owner"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn update_group(
    State(state): State<GroupsApiState>,
    auth: GroupOwner,
    ValidatedJson(body): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<GroupDto>, ApiError> {
    let updated = group::update_group(
        state.database.pool(),
        &auth.group_id,
        body.name.as_deref(),
        body.description.as_deref(),
        body.location.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| {
        ApiError::not_found(
            "GROUP_NOT_FOUND",
            format!("Group not found: {}", auth.group_id),
        )
    })?;

    Ok(Json(GroupDto::from(updated)))
}

/// Delete a group (owner only). Memberships, scheduled runs, attendance and
/// chat history cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 403, description = "Not the group owner"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn delete_group(
    State(state): State<GroupsApiState>,
    auth: GroupOwner,
) -> Result<StatusCode, ApiError> {
    let deleted = group::delete_group(state.database.pool(), &auth.group_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    if !deleted {
        return Err(ApiError::not_found(
            "GROUP_NOT_FOUND",
            format!("Group not found: {}", auth.group_id),
        ));
    }

    tracing::info!(group_id = %auth.group_id, "Group deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// List members of a group (members only; owner listed first)
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/members",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "List of members with pagination metadata"),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn list_members(
    State(state): State<GroupsApiState>,
    auth: GroupMember,
    ValidatedQuery(query): ValidatedQuery<ListMembersQuery>,
) -> Result<Json<PaginatedResponse<MemberDto>>, ApiError> {
    let (members, total) = membership::list_members(
        state.database.pool(),
        &auth.group_id,
        query.page,
        query.limit,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<MemberDto> = members.into_iter().map(MemberDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Join a group as the requesting user
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/members",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 201, description = "Joined the group"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Already a member")
    )
)]
pub async fn join_group(
    State(state): State<GroupsApiState>,
    auth: Auth,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&group_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid group id"));
    }

    match membership::join(state.database.pool(), &group_id, auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?
    {
        JoinResult::Joined(_) => {
            tracing::info!(group_id = %group_id, user_id = %auth.user_id(), "Member joined");
            Ok(StatusCode::CREATED)
        }
        JoinResult::AlreadyMember => Err(ApiError::conflict(
            "ALREADY_MEMBER",
            "You are already a member of this group",
        )),
        JoinResult::GroupNotFound => Err(ApiError::not_found(
            "GROUP_NOT_FOUND",
            format!("Group not found: {}", group_id),
        )),
    }
}

/// Leave a group. The owner cannot leave their own group.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}/members/me",
    tag = "groups",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 204, description = "Left the group"),
        (status = 403, description = "Owner cannot leave own group"),
        (status = 404, description = "Group or membership not found")
    )
)]
pub async fn leave_group(
    State(state): State<GroupsApiState>,
    auth: Auth,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&group_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid group id"));
    }

    match membership::leave(state.database.pool(), &group_id, auth.user_id())
        .await
        .map_err(ApiError::from_sqlite)?
    {
        LeaveResult::Left => Ok(StatusCode::NO_CONTENT),
        LeaveResult::OwnerCannotLeave => Err(ApiError::forbidden(
            "OWNER_CANNOT_LEAVE",
            "The owner cannot leave their own group",
        )),
        LeaveResult::NotAMember => Err(ApiError::not_found(
            "NOT_A_MEMBER",
            "You are not a member of this group",
        )),
        LeaveResult::GroupNotFound => Err(ApiError::not_found(
            "GROUP_NOT_FOUND",
            format!("Group not found: {}", group_id),
        )),
    }
}
