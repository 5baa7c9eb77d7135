use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_student_by_id, get_students, toggle_student_status,
    update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route(
            "/{id}",
            get(get_student_by_id)
                .patch(update_student)
                .delete(delete_student),
        )
        .route("/{id}/toggle-status", patch(toggle_student_status))
}
