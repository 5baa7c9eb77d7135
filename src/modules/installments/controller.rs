use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::installments::model::{
    CreateInstallmentDto, InstallmentFilterParams, InstallmentResponse, PayInstallmentDto,
    SweepOverdueResponse, UpdateInstallmentDto,
};
use crate::modules::installments::service::InstallmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/installments",
    request_body = CreateInstallmentDto,
    responses(
        (status = 201, description = "Installment created", body = InstallmentResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Sequence number already exists for contract")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_installment(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateInstallmentDto>,
) -> Result<(StatusCode, Json<InstallmentResponse>), AppError> {
    let installment = InstallmentService::create_installment(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(installment)))
}

#[utoipa::path(
    get,
    path = "/api/installments",
    params(InstallmentFilterParams),
    responses(
        (status = 200, description = "List of installments", body = Vec<InstallmentResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_installments(
    State(state): State<AppState>,
    Query(filters): Query<InstallmentFilterParams>,
) -> Result<Json<Vec<InstallmentResponse>>, AppError> {
    let installments = InstallmentService::get_all_installments(&state.db, filters).await?;

    Ok(Json(installments))
}

#[utoipa::path(
    get,
    path = "/api/installments/{id}",
    params(("id" = i32, Path, description = "Installment ID")),
    responses(
        (status = 200, description = "Installment with derived fields", body = InstallmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Installment not found")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_installment_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InstallmentResponse>, AppError> {
    let installment = InstallmentService::get_installment_by_id(&state.db, id).await?;

    Ok(Json(installment))
}

#[utoipa::path(
    patch,
    path = "/api/installments/{id}",
    params(("id" = i32, Path, description = "Installment ID")),
    request_body = UpdateInstallmentDto,
    responses(
        (status = 200, description = "Installment updated", body = InstallmentResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Installment not found"),
        (status = 409, description = "Amount frozen by recorded payments")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_installment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateInstallmentDto>,
) -> Result<Json<InstallmentResponse>, AppError> {
    let installment = InstallmentService::update_installment(&state.db, id, dto).await?;

    Ok(Json(installment))
}

#[utoipa::path(
    post,
    path = "/api/installments/{id}/pay",
    params(("id" = i32, Path, description = "Installment ID")),
    request_body = PayInstallmentDto,
    responses(
        (status = 200, description = "Payment recorded", body = InstallmentResponse),
        (status = 400, description = "Non-positive payment amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Installment not found"),
        (status = 409, description = "Overpayment, already paid, or cancelled")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn pay_installment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<PayInstallmentDto>,
) -> Result<Json<InstallmentResponse>, AppError> {
    let installment = InstallmentService::pay(&state.db, id, dto).await?;

    Ok(Json(installment))
}

#[utoipa::path(
    patch,
    path = "/api/installments/{id}/cancel",
    params(("id" = i32, Path, description = "Installment ID")),
    responses(
        (status = 200, description = "Installment cancelled", body = InstallmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Installment not found"),
        (status = 409, description = "Paid or already cancelled")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn cancel_installment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InstallmentResponse>, AppError> {
    let installment = InstallmentService::cancel(&state.db, id).await?;

    Ok(Json(installment))
}

#[utoipa::path(
    post,
    path = "/api/installments/sweep-overdue",
    responses(
        (status = 200, description = "Past-due PENDING installments marked OVERDUE", body = SweepOverdueResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn sweep_overdue(
    State(state): State<AppState>,
) -> Result<Json<SweepOverdueResponse>, AppError> {
    let result = InstallmentService::sweep_overdue(&state.db).await?;

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/installments/{id}",
    params(("id" = i32, Path, description = "Installment ID")),
    responses(
        (status = 200, description = "Installment deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Installment not found"),
        (status = 409, description = "Recorded payments block deletion")
    ),
    tag = "Installments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_installment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    InstallmentService::delete_installment(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Installment deleted successfully".to_string(),
    }))
}
