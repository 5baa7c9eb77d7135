use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::departments::model::{
    CreateDepartmentDto, Department, DepartmentFilterParams, DepartmentWithFaculty,
    UpdateDepartmentDto,
};
use crate::modules::departments::service::DepartmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Name already exists in faculty")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_department(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    let department = DepartmentService::create_department(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    params(DepartmentFilterParams),
    responses(
        (status = 200, description = "List of departments", body = Vec<Department>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_departments(
    State(state): State<AppState>,
    Query(filters): Query<DepartmentFilterParams>,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = DepartmentService::get_all_departments(&state.db, filters).await?;

    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department with faculty", body = DepartmentWithFaculty),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_department_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DepartmentWithFaculty>, AppError> {
    let department = DepartmentService::get_department_by_id(&state.db, id).await?;

    Ok(Json(department))
}

#[utoipa::path(
    patch,
    path = "/api/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    request_body = UpdateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Department or faculty not found"),
        (status = 409, description = "Name already exists in faculty")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateDepartmentDto>,
) -> Result<Json<Department>, AppError> {
    let department = DepartmentService::update_department(&state.db, id, dto).await?;

    Ok(Json(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    DepartmentService::delete_department(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Department deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/departments/{id}/toggle-status",
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department status toggled", body = Department),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_department_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Department>, AppError> {
    let department = DepartmentService::toggle_status(&state.db, id).await?;

    Ok(Json(department))
}
