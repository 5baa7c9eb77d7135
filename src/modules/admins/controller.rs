use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::middleware::auth::AuthAdmin;
use crate::middleware::guard::{ensure_self_or_super, ensure_super};
use crate::modules::admins::model::{Admin, AdminFilterParams, CreateAdminDto, UpdateAdminDto};
use crate::modules::admins::service::AdminService;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/admins",
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "Admin created, pending approval", body = Admin),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto))]
pub async fn create_admin(
    State(state): State<AppState>,
    auth: AuthAdmin,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<(StatusCode, Json<Admin>), AppError> {
    ensure_super(&auth)?;

    let admin =
        AdminService::create_admin(&state.db, dto, state.security_config.bcrypt_cost).await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

#[utoipa::path(
    get,
    path = "/api/admins",
    params(AdminFilterParams),
    responses(
        (status = 200, description = "List of admins", body = Vec<Admin>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn get_admins(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Query(filters): Query<AdminFilterParams>,
) -> Result<Json<Vec<Admin>>, AppError> {
    ensure_super(&auth)?;

    let admins = AdminService::get_all_admins(&state.db, filters).await?;

    Ok(Json(admins))
}

#[utoipa::path(
    get,
    path = "/api/admins/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin details", body = Admin),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - owner or super admin only"),
        (status = 404, description = "Admin not found")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn get_admin_by_id(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Admin>, AppError> {
    ensure_self_or_super(&auth, id)?;

    let admin = AdminService::get_admin_by_id(&state.db, id).await?;

    Ok(Json(admin))
}

#[utoipa::path(
    patch,
    path = "/api/admins/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    request_body = UpdateAdminDto,
    responses(
        (status = 200, description = "Admin updated", body = Admin),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - owner or super admin only"),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth, dto))]
pub async fn update_admin(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateAdminDto>,
) -> Result<Json<Admin>, AppError> {
    ensure_self_or_super(&auth, id)?;

    let admin =
        AdminService::update_admin(&state.db, id, dto, state.security_config.bcrypt_cost).await?;

    Ok(Json(admin))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Cannot delete own account")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn delete_admin(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_super(&auth)?;

    if auth.admin_id()? == id {
        return Err(AppError::conflict(anyhow::anyhow!(
            "Cannot delete your own account"
        )));
    }

    AdminService::delete_admin(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Admin deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/admins/{id}/approve",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin approved", body = Admin),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 404, description = "Admin not found")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn approve_admin(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Admin>, AppError> {
    ensure_super(&auth)?;

    let admin = AdminService::approve_admin(&state.db, id).await?;

    Ok(Json(admin))
}

#[utoipa::path(
    patch,
    path = "/api/admins/{id}/toggle-status",
    params(("id" = i32, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin status toggled", body = Admin),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - super admin only"),
        (status = 404, description = "Admin not found")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn toggle_admin_status(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Admin>, AppError> {
    ensure_super(&auth)?;

    let admin = AdminService::toggle_status(&state.db, id).await?;

    Ok(Json(admin))
}
