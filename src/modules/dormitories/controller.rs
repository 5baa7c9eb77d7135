use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::dormitories::model::{
    AssignStudentDto, CreateDormitoryDto, CreateRoomDto, Dormitory, DormitoryFilterParams,
    DormitoryStats, RoomFilterParams, RoomWithOccupancy, UpdateDormitoryDto, UpdateRoomDto,
};
use crate::modules::dormitories::service::DormitoryService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/dormitories",
    request_body = CreateDormitoryDto,
    responses(
        (status = 201, description = "Dormitory created", body = Dormitory),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already exists")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_dormitory(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDormitoryDto>,
) -> Result<(StatusCode, Json<Dormitory>), AppError> {
    let dormitory = DormitoryService::create_dormitory(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(dormitory)))
}

#[utoipa::path(
    get,
    path = "/api/dormitories",
    params(DormitoryFilterParams),
    responses(
        (status = 200, description = "List of dormitories", body = Vec<Dormitory>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_dormitories(
    State(state): State<AppState>,
    Query(filters): Query<DormitoryFilterParams>,
) -> Result<Json<Vec<Dormitory>>, AppError> {
    let dormitories = DormitoryService::get_all_dormitories(&state.db, filters).await?;

    Ok(Json(dormitories))
}

#[utoipa::path(
    get,
    path = "/api/dormitories/{id}",
    params(("id" = i32, Path, description = "Dormitory ID")),
    responses(
        (status = 200, description = "Dormitory details", body = Dormitory),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_dormitory_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Dormitory>, AppError> {
    let dormitory = DormitoryService::get_dormitory_by_id(&state.db, id).await?;

    Ok(Json(dormitory))
}

#[utoipa::path(
    patch,
    path = "/api/dormitories/{id}",
    params(("id" = i32, Path, description = "Dormitory ID")),
    request_body = UpdateDormitoryDto,
    responses(
        (status = 200, description = "Dormitory updated", body = Dormitory),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found"),
        (status = 409, description = "Name already exists")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_dormitory(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateDormitoryDto>,
) -> Result<Json<Dormitory>, AppError> {
    let dormitory = DormitoryService::update_dormitory(&state.db, id, dto).await?;

    Ok(Json(dormitory))
}

#[utoipa::path(
    delete,
    path = "/api/dormitories/{id}",
    params(("id" = i32, Path, description = "Dormitory ID")),
    responses(
        (status = 200, description = "Dormitory deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found"),
        (status = 409, description = "Rooms still reference it")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_dormitory(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    DormitoryService::delete_dormitory(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Dormitory deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/dormitories/{id}/toggle-status",
    params(("id" = i32, Path, description = "Dormitory ID")),
    responses(
        (status = 200, description = "Dormitory status toggled", body = Dormitory),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_dormitory_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Dormitory>, AppError> {
    let dormitory = DormitoryService::toggle_status(&state.db, id).await?;

    Ok(Json(dormitory))
}

#[utoipa::path(
    get,
    path = "/api/dormitories/{id}/stats",
    params(("id" = i32, Path, description = "Dormitory ID")),
    responses(
        (status = 200, description = "Occupancy statistics", body = DormitoryStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_dormitory_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DormitoryStats>, AppError> {
    let stats = DormitoryService::get_dormitory_stats(&state.db, id).await?;

    Ok(Json(stats))
}

#[utoipa::path(
    post,
    path = "/api/dormitories/{id}/rooms",
    params(("id" = i32, Path, description = "Dormitory ID")),
    request_body = CreateRoomDto,
    responses(
        (status = 201, description = "Room created", body = RoomWithOccupancy),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found"),
        (status = 409, description = "Room number already exists in dormitory")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<CreateRoomDto>,
) -> Result<(StatusCode, Json<RoomWithOccupancy>), AppError> {
    let room = DormitoryService::create_room(&state.db, id, dto).await?;

    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    get,
    path = "/api/dormitories/{id}/rooms",
    params(("id" = i32, Path, description = "Dormitory ID"), RoomFilterParams),
    responses(
        (status = 200, description = "Rooms with occupancy", body = Vec<RoomWithOccupancy>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Dormitory not found")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_rooms(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(filters): Query<RoomFilterParams>,
) -> Result<Json<Vec<RoomWithOccupancy>>, AppError> {
    let rooms = DormitoryService::get_rooms(&state.db, id, filters).await?;

    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/dormitories/rooms/{id}",
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room with occupancy", body = RoomWithOccupancy),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_room_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoomWithOccupancy>, AppError> {
    let room = DormitoryService::get_room_by_id(&state.db, id).await?;

    Ok(Json(room))
}

#[utoipa::path(
    patch,
    path = "/api/dormitories/rooms/{id}",
    params(("id" = i32, Path, description = "Room ID")),
    request_body = UpdateRoomDto,
    responses(
        (status = 200, description = "Room updated", body = RoomWithOccupancy),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room number taken or beds below occupancy")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateRoomDto>,
) -> Result<Json<RoomWithOccupancy>, AppError> {
    let room = DormitoryService::update_room(&state.db, id, dto).await?;

    Ok(Json(room))
}

#[utoipa::path(
    delete,
    path = "/api/dormitories/rooms/{id}",
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Students still live in the room")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    DormitoryService::delete_room(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Room deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/dormitories/rooms/{id}/assign",
    params(("id" = i32, Path, description = "Room ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student assigned", body = RoomWithOccupancy),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room or student not found"),
        (status = 409, description = "Room unavailable, full, or student already housed")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn assign_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<AssignStudentDto>,
) -> Result<Json<RoomWithOccupancy>, AppError> {
    let room = DormitoryService::assign_student(&state.db, id, dto.student_id).await?;

    Ok(Json(room))
}

#[utoipa::path(
    post,
    path = "/api/dormitories/rooms/{id}/unassign",
    params(("id" = i32, Path, description = "Room ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student unassigned", body = RoomWithOccupancy),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found or student not in room")
    ),
    tag = "Dormitories",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn unassign_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<AssignStudentDto>,
) -> Result<Json<RoomWithOccupancy>, AppError> {
    let room = DormitoryService::unassign_student(&state.db, id, dto.student_id).await?;

    Ok(Json(room))
}
