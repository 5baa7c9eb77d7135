use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::groups::model::{
    CreateGroupDto, Group, GroupFilterParams, GroupWithStats, UpdateGroupDto,
};
use crate::modules::groups::service::GroupService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Name already exists in faculty")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateGroupDto>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let group = GroupService::create_group(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    params(GroupFilterParams),
    responses(
        (status = 200, description = "List of groups", body = Vec<Group>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_groups(
    State(state): State<AppState>,
    Query(filters): Query<GroupFilterParams>,
) -> Result<Json<Vec<Group>>, AppError> {
    let groups = GroupService::get_all_groups(&state.db, filters).await?;

    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(("id" = i32, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group with faculty and student count", body = GroupWithStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_group_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GroupWithStats>, AppError> {
    let group = GroupService::get_group_by_id(&state.db, id).await?;

    Ok(Json(group))
}

#[utoipa::path(
    patch,
    path = "/api/groups/{id}",
    params(("id" = i32, Path, description = "Group ID")),
    request_body = UpdateGroupDto,
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group or faculty not found"),
        (status = 409, description = "Name already exists in faculty")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateGroupDto>,
) -> Result<Json<Group>, AppError> {
    let group = GroupService::update_group(&state.db, id, dto).await?;

    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(("id" = i32, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Students still reference the group")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    GroupService::delete_group(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Group deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/groups/{id}/toggle-status",
    params(("id" = i32, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group status toggled", body = Group),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found")
    ),
    tag = "Groups",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_group_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Group>, AppError> {
    let group = GroupService::toggle_status(&state.db, id).await?;

    Ok(Json(group))
}
