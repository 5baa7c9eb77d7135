use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithRelations, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = StudentWithRelations),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group or faculty not found"),
        (status = 409, description = "Passport, JSHSHIR, or email already registered")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<StudentWithRelations>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "List of students", body = Vec<Student>),
        (status = 400, description = "Unknown sort column"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(filters): Query<StudentFilterParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = StudentService::get_all_students(&state.db, filters).await?;

    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student with relations", body = StudentWithRelations),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentWithRelations>, AppError> {
    let student = StudentService::get_student_by_id(&state.db, id).await?;

    Ok(Json(student))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = StudentWithRelations),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student, group, or faculty not found"),
        (status = 409, description = "Passport, JSHSHIR, or email already registered")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentWithRelations>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;

    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student removed", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Contracts, payments, or scholarships still reference them")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    StudentService::remove_student(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Student deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/toggle-status",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student status toggled", body = Student),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_student_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::toggle_status(&state.db, id).await?;

    Ok(Json(student))
}
