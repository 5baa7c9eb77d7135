use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_scholarship, delete_scholarship, get_scholarship_by_id, get_scholarships,
    toggle_scholarship_status, update_scholarship,
};

pub fn init_scholarships_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_scholarship).get(get_scholarships))
        .route(
            "/{id}",
            get(get_scholarship_by_id)
                .patch(update_scholarship)
                .delete(delete_scholarship),
        )
        .route("/{id}/toggle-status", patch(toggle_scholarship_status))
}
