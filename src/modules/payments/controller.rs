use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::modules::auth::model::MessageResponse;
use crate::modules::payments::model::{
    CreatePaymentDto, Payment, PaymentFilterParams, PaymentStats, UpdatePaymentDto,
    UpdatePaymentStatusDto,
};
use crate::modules::payments::service::PaymentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentDto,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 400, description = "Non-positive amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student or installment not found")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_payment(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePaymentDto>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let payment = PaymentService::create_payment(&state.db, dto).await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    params(PaymentFilterParams),
    responses(
        (status = 200, description = "List of payments", body = Vec<Payment>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_payments(
    State(state): State<AppState>,
    Query(filters): Query<PaymentFilterParams>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = PaymentService::get_all_payments(&state.db, filters).await?;

    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/api/payments/stats",
    responses(
        (status = 200, description = "Counts and sums per status", body = PaymentStats),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_payment_stats(
    State(state): State<AppState>,
) -> Result<Json<PaymentStats>, AppError> {
    let stats = PaymentService::get_stats(&state.db).await?;

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Payment not found")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_payment_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::get_payment_by_id(&state.db, id).await?;

    Ok(Json(payment))
}

#[utoipa::path(
    patch,
    path = "/api/payments/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = UpdatePaymentDto,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Non-positive amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Cancelled payments are frozen")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdatePaymentDto>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::update_payment(&state.db, id, dto).await?;

    Ok(Json(payment))
}

#[utoipa::path(
    patch,
    path = "/api/payments/{id}/status",
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusDto,
    responses(
        (status = 200, description = "Status changed, balance cascaded", body = Payment),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Cancelled payments are terminal")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdatePaymentStatusDto>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::update_status(&state.db, id, dto).await?;

    Ok(Json(payment))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Successful payments cannot be deleted")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    PaymentService::delete_payment(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Payment deleted successfully".to_string(),
    }))
}
