use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_faculty, delete_faculty, get_faculties, get_faculty_by_id, get_faculty_stats,
    toggle_faculty_status, update_faculty,
};

pub fn init_faculties_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_faculty).get(get_faculties))
        .route(
            "/{id}",
            get(get_faculty_by_id)
                .patch(update_faculty)
                .delete(delete_faculty),
        )
        .route("/{id}/toggle-status", patch(toggle_faculty_status))
        .route("/{id}/stats", get(get_faculty_stats))
}
