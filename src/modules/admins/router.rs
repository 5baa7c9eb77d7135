use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{
    approve_admin, create_admin, delete_admin, get_admin_by_id, get_admins, toggle_admin_status,
    update_admin,
};

pub fn init_admins_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_admin).get(get_admins))
        .route(
            "/{id}",
            get(get_admin_by_id)
                .patch(update_admin)
                .delete(delete_admin),
        )
        .route("/{id}/approve", patch(approve_admin))
        .route("/{id}/toggle-status", patch(toggle_admin_status))
}
