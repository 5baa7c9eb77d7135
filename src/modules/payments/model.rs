use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::deserialize_optional_i32;
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i32,
    pub student_id: i32,
    pub installment_id: Option<i32>,
    pub amount: Decimal,
    pub payment_type: String,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Cash,
    Card,
    Transfer,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "CASH",
            PaymentType::Card => "CARD",
            PaymentType::Transfer => "TRANSFER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentDto {
    #[validate(range(min = 1))]
    pub student_id: i32,
    #[validate(range(min = 1))]
    pub installment_id: Option<i32>,
    pub amount: Decimal,
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentDto {
    pub amount: Option<Decimal>,
    pub payment_type: Option<PaymentType>,
    pub notes: Option<String>,
}

/// Body of `PATCH /payments/{id}/status`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusDto {
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaymentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub student_id: Option<i32>,
    pub status: Option<PaymentStatus>,
    pub payment_type: Option<PaymentType>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PaymentStatusStat {
    pub status: String,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStats {
    pub by_status: Vec<PaymentStatusStat>,
}
