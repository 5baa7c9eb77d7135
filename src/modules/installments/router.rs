use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    cancel_installment, create_installment, delete_installment, get_installment_by_id,
    get_installments, pay_installment, sweep_overdue, update_installment,
};

pub fn init_installments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_installment).get(get_installments))
        .route("/sweep-overdue", post(sweep_overdue))
        .route(
            "/{id}",
            get(get_installment_by_id)
                .patch(update_installment)
                .delete(delete_installment),
        )
        .route("/{id}/pay", post(pay_installment))
        .route("/{id}/cancel", patch(cancel_installment))
}
