use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_contract, delete_contract, get_contract_by_id, get_contract_with_installments,
    get_contracts, update_contract,
};

pub fn init_contracts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_contract).get(get_contracts))
        .route(
            "/{id}",
            get(get_contract_by_id)
                .patch(update_contract)
                .delete(delete_contract),
        )
        .route("/{id}/with-installments", get(get_contract_with_installments))
}
