use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_department, delete_department, get_department_by_id, get_departments,
    toggle_department_status, update_department,
};

pub fn init_departments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_department).get(get_departments))
        .route(
            "/{id}",
            get(get_department_by_id)
                .patch(update_department)
                .delete(delete_department),
        )
        .route("/{id}/toggle-status", patch(toggle_department_status))
}
