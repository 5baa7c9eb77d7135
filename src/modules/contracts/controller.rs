use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::contracts::model::{
    Contract, ContractFilterParams, ContractWithInstallments, CreateContractDto,
    UpdateContractDto,
};
use crate::modules::contracts::service::ContractService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/contracts",
    request_body = CreateContractDto,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 400, description = "Invalid amount or dates"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Contract number already exists")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_contract(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateContractDto>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    let contract = ContractService::create_contract(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

#[utoipa::path(
    get,
    path = "/api/contracts",
    params(ContractFilterParams),
    responses(
        (status = 200, description = "List of contracts", body = Vec<Contract>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_contracts(
    State(state): State<AppState>,
    Query(filters): Query<ContractFilterParams>,
) -> Result<Json<Vec<Contract>>, AppError> {
    let contracts = ContractService::get_all_contracts(&state.db, filters).await?;

    Ok(Json(contracts))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    params(("id" = i32, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract details", body = Contract),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_contract_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Contract>, AppError> {
    let contract = ContractService::get_contract_by_id(&state.db, id).await?;

    Ok(Json(contract))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}/with-installments",
    params(("id" = i32, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract with its installment schedule", body = ContractWithInstallments),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_contract_with_installments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContractWithInstallments>, AppError> {
    let contract = ContractService::get_contract_with_installments(&state.db, id).await?;

    Ok(Json(contract))
}

#[utoipa::path(
    patch,
    path = "/api/contracts/{id}",
    params(("id" = i32, Path, description = "Contract ID")),
    request_body = UpdateContractDto,
    responses(
        (status = 200, description = "Contract updated", body = Contract),
        (status = 400, description = "Invalid amount or dates"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Number taken or invalid status transition")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateContractDto>,
) -> Result<Json<Contract>, AppError> {
    let contract = ContractService::update_contract(&state.db, id, dto).await?;

    Ok(Json(contract))
}

#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    params(("id" = i32, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Installments still reference it")
    ),
    tag = "Contracts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_contract(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    ContractService::delete_contract(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Contract deleted successfully".to_string(),
    }))
}
