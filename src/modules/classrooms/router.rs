use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_classroom, delete_classroom, get_classroom_by_id, get_classrooms,
    toggle_classroom_status, update_classroom,
};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_classroom).get(get_classrooms))
        .route(
            "/{id}",
            get(get_classroom_by_id)
                .patch(update_classroom)
                .delete(delete_classroom),
        )
        .route("/{id}/toggle-status", patch(toggle_classroom_status))
}
