use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    assign_student, create_dormitory, create_room, delete_dormitory, delete_room,
    get_dormitories, get_dormitory_by_id, get_dormitory_stats, get_room_by_id, get_rooms,
    toggle_dormitory_status, unassign_student, update_dormitory, update_room,
};

pub fn init_dormitories_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_dormitory).get(get_dormitories))
        // room routes come before `/{id}` so `/rooms/...` never parses as an id
        .route(
            "/rooms/{id}",
            get(get_room_by_id).patch(update_room).delete(delete_room),
        )
        .route("/rooms/{id}/assign", post(assign_student))
        .route("/rooms/{id}/unassign", post(unassign_student))
        .route(
            "/{id}",
            get(get_dormitory_by_id)
                .patch(update_dormitory)
                .delete(delete_dormitory),
        )
        .route("/{id}/toggle-status", patch(toggle_dormitory_status))
        .route("/{id}/stats", get(get_dormitory_stats))
        .route("/{id}/rooms", post(create_room).get(get_rooms))
}
