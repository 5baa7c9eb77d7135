use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_payment, delete_payment, get_payment_by_id, get_payment_stats, get_payments,
    update_payment, update_payment_status,
};

pub fn init_payments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment).get(get_payments))
        .route("/stats", get(get_payment_stats))
        .route(
            "/{id}",
            get(get_payment_by_id)
                .patch(update_payment)
                .delete(delete_payment),
        )
        .route("/{id}/status", patch(update_payment_status))
}
