use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::faculties::model::{
    CreateFacultyDto, Faculty, FacultyFilterParams, FacultyStats, UpdateFacultyDto,
};
use crate::modules::faculties::service::FacultyService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/faculties",
    request_body = CreateFacultyDto,
    responses(
        (status = 201, description = "Faculty created", body = Faculty),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name or code already exists")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_faculty(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFacultyDto>,
) -> Result<(StatusCode, Json<Faculty>), AppError> {
    let faculty = FacultyService::create_faculty(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(faculty)))
}

#[utoipa::path(
    get,
    path = "/api/faculties",
    params(FacultyFilterParams),
    responses(
        (status = 200, description = "List of faculties", body = Vec<Faculty>),
        (status = 400, description = "Unknown sort column"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_faculties(
    State(state): State<AppState>,
    Query(filters): Query<FacultyFilterParams>,
) -> Result<Json<Vec<Faculty>>, AppError> {
    let faculties = FacultyService::get_all_faculties(&state.db, filters).await?;

    Ok(Json(faculties))
}

#[utoipa::path(
    get,
    path = "/api/faculties/{id}",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty details", body = Faculty),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_faculty_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = FacultyService::get_faculty_by_id(&state.db, id).await?;

    Ok(Json(faculty))
}

#[utoipa::path(
    patch,
    path = "/api/faculties/{id}",
    params(("id" = i32, Path, description = "Faculty ID")),
    request_body = UpdateFacultyDto,
    responses(
        (status = 200, description = "Faculty updated", body = Faculty),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Name or code already exists")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateFacultyDto>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = FacultyService::update_faculty(&state.db, id, dto).await?;

    Ok(Json(faculty))
}

#[utoipa::path(
    delete,
    path = "/api/faculties/{id}",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Departments, groups, or students still reference it")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    FacultyService::delete_faculty(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Faculty deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/faculties/{id}/toggle-status",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty status toggled", body = Faculty),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_faculty_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = FacultyService::toggle_status(&state.db, id).await?;

    Ok(Json(faculty))
}

#[utoipa::path(
    get,
    path = "/api/faculties/{id}/stats",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty statistics", body = FacultyStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculties",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_faculty_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FacultyStats>, AppError> {
    let stats = FacultyService::get_faculty_stats(&state.db, id).await?;

    Ok(Json(stats))
}
