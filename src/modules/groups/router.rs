use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_group, delete_group, get_group_by_id, get_groups, toggle_group_status, update_group,
};

pub fn init_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_group).get(get_groups))
        .route(
            "/{id}",
            get(get_group_by_id).patch(update_group).delete(delete_group),
        )
        .route("/{id}/toggle-status", patch(toggle_group_status))
}
