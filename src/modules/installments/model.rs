use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::deserialize_optional_i32;
use unibase_core::{PaginationParams, SortParams};

/// Raw installment row as stored.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Installment {
    pub id: i32,
    pub contract_id: i32,
    pub sequence_no: i32,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API view of an installment with the derived fields computed at read time.
/// None of these are persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct InstallmentResponse {
    pub id: i32,
    pub contract_id: i32,
    pub sequence_no: i32,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub is_fully_paid: bool,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: String,
    pub overdue_days: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Installment> for InstallmentResponse {
    fn from(row: Installment) -> Self {
        let remaining_amount = row.amount - row.paid_amount;
        let is_fully_paid = row.paid_amount >= row.amount;
        let overdue_days =
            calculate_overdue_days(&row.status, row.due_date, Utc::now().date_naive());

        Self {
            id: row.id,
            contract_id: row.contract_id,
            sequence_no: row.sequence_no,
            amount: row.amount,
            paid_amount: row.paid_amount,
            remaining_amount,
            is_fully_paid,
            due_date: row.due_date,
            payment_date: row.payment_date,
            status: row.status,
            overdue_days,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "PENDING",
            InstallmentStatus::Paid => "PAID",
            InstallmentStatus::Overdue => "OVERDUE",
            InstallmentStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Days an installment is late. Zero unless it is still being tracked
/// (PENDING or OVERDUE) and the due date is strictly in the past.
pub fn calculate_overdue_days(status: &str, due_date: NaiveDate, today: NaiveDate) -> i64 {
    if status != "PENDING" && status != "OVERDUE" {
        return 0;
    }

    if due_date >= today {
        return 0;
    }

    (today - due_date).num_days()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInstallmentDto {
    #[validate(range(min = 1))]
    pub contract_id: i32,
    #[validate(range(min = 1))]
    pub sequence_no: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInstallmentDto {
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Body of `POST /installments/{id}/pay`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PayInstallmentDto {
    pub paid_amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepOverdueResponse {
    pub swept: u64,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct InstallmentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub contract_id: Option<i32>,
    pub status: Option<InstallmentStatus>,
    pub due_before: Option<NaiveDate>,
    pub due_after: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_days_zero_when_not_due() {
        assert_eq!(
            calculate_overdue_days("PENDING", date(2026, 1, 10), date(2026, 1, 10)),
            0
        );
        assert_eq!(
            calculate_overdue_days("PENDING", date(2026, 1, 15), date(2026, 1, 10)),
            0
        );
    }

    #[test]
    fn test_overdue_days_counts_past_due() {
        assert_eq!(
            calculate_overdue_days("PENDING", date(2026, 1, 1), date(2026, 1, 10)),
            9
        );
        assert_eq!(
            calculate_overdue_days("OVERDUE", date(2025, 12, 31), date(2026, 1, 10)),
            10
        );
    }

    #[test]
    fn test_overdue_days_zero_for_settled_states() {
        assert_eq!(
            calculate_overdue_days("PAID", date(2025, 1, 1), date(2026, 1, 10)),
            0
        );
        assert_eq!(
            calculate_overdue_days("CANCELLED", date(2025, 1, 1), date(2026, 1, 10)),
            0
        );
    }

    #[test]
    fn test_response_derives_remaining_and_fully_paid() {
        let row = Installment {
            id: 1,
            contract_id: 1,
            sequence_no: 1,
            amount: Decimal::new(500_000, 0),
            paid_amount: Decimal::new(200_000, 0),
            due_date: date(2030, 1, 1),
            payment_date: None,
            status: "PENDING".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = InstallmentResponse::from(row);
        assert_eq!(response.remaining_amount, Decimal::new(300_000, 0));
        assert!(!response.is_fully_paid);
        assert_eq!(response.overdue_days, 0);
    }
}
