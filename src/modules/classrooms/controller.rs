use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::classrooms::model::{
    Classroom, ClassroomFilterParams, CreateClassroomDto, UpdateClassroomDto,
};
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already exists in building")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom = ClassroomService::create_classroom(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms",
    params(ClassroomFilterParams),
    responses(
        (status = 200, description = "List of classrooms", body = Vec<Classroom>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classrooms(
    State(state): State<AppState>,
    Query(filters): Query<ClassroomFilterParams>,
) -> Result<Json<Vec<Classroom>>, AppError> {
    let classrooms = ClassroomService::get_all_classrooms(&state.db, filters).await?;

    Ok(Json(classrooms))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = i32, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom details", body = Classroom),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Classroom not found")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::get_classroom_by_id(&state.db, id).await?;

    Ok(Json(classroom))
}

#[utoipa::path(
    patch,
    path = "/api/classrooms/{id}",
    params(("id" = i32, Path, description = "Classroom ID")),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated", body = Classroom),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Classroom not found"),
        (status = 409, description = "Name already exists in building")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_classroom(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateClassroomDto>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::update_classroom(&state.db, id, dto).await?;

    Ok(Json(classroom))
}

#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = i32, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Classroom not found")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_classroom(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    ClassroomService::delete_classroom(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Classroom deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/classrooms/{id}/toggle-status",
    params(("id" = i32, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom status toggled", body = Classroom),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Classroom not found")
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_classroom_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::toggle_status(&state.db, id).await?;

    Ok(Json(classroom))
}
