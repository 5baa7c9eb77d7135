use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::scholarships::model::{
    CreateScholarshipDto, Scholarship, ScholarshipFilterParams, UpdateScholarshipDto,
};
use crate::modules::scholarships::service::ScholarshipService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/scholarships",
    request_body = CreateScholarshipDto,
    responses(
        (status = 201, description = "Scholarship created", body = Scholarship),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student already has a scholarship this year")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_scholarship(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateScholarshipDto>,
) -> Result<(StatusCode, Json<Scholarship>), AppError> {
    let scholarship = ScholarshipService::create_scholarship(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(scholarship)))
}

#[utoipa::path(
    get,
    path = "/api/scholarships",
    params(ScholarshipFilterParams),
    responses(
        (status = 200, description = "List of scholarships", body = Vec<Scholarship>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_scholarships(
    State(state): State<AppState>,
    Query(filters): Query<ScholarshipFilterParams>,
) -> Result<Json<Vec<Scholarship>>, AppError> {
    let scholarships = ScholarshipService::get_all_scholarships(&state.db, filters).await?;

    Ok(Json(scholarships))
}

#[utoipa::path(
    get,
    path = "/api/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship ID")),
    responses(
        (status = 200, description = "Scholarship details", body = Scholarship),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Scholarship not found")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_scholarship_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Scholarship>, AppError> {
    let scholarship = ScholarshipService::get_scholarship_by_id(&state.db, id).await?;

    Ok(Json(scholarship))
}

#[utoipa::path(
    patch,
    path = "/api/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship ID")),
    request_body = UpdateScholarshipDto,
    responses(
        (status = 200, description = "Scholarship updated", body = Scholarship),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Scholarship not found"),
        (status = 409, description = "Student already has a scholarship this year")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_scholarship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateScholarshipDto>,
) -> Result<Json<Scholarship>, AppError> {
    let scholarship = ScholarshipService::update_scholarship(&state.db, id, dto).await?;

    Ok(Json(scholarship))
}

#[utoipa::path(
    delete,
    path = "/api/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship ID")),
    responses(
        (status = 200, description = "Scholarship deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Scholarship not found")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_scholarship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    ScholarshipService::delete_scholarship(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Scholarship deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/scholarships/{id}/toggle-status",
    params(("id" = i32, Path, description = "Scholarship ID")),
    responses(
        (status = 200, description = "Scholarship status toggled", body = Scholarship),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Scholarship not found")
    ),
    tag = "Scholarships",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_scholarship_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Scholarship>, AppError> {
    let scholarship = ScholarshipService::toggle_status(&state.db, id).await?;

    Ok(Json(scholarship))
}
