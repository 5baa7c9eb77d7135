use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::installments::model::InstallmentResponse;
use unibase_core::serde::deserialize_optional_i32;
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contract {
    pub id: i32,
    pub contract_number: String,
    pub student_id: i32,
    pub academic_year: i32,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractStatus {
    Active,
    Completed,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "ACTIVE",
            ContractStatus::Completed => "COMPLETED",
            ContractStatus::Terminated => "TERMINATED",
        }
    }

    /// ACTIVE is the only state a contract may leave.
    pub fn can_transition_from(current: &str, next: ContractStatus) -> bool {
        match current {
            "ACTIVE" => true,
            _ => next.as_str() == current,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractWithInstallments {
    #[serde(flatten)]
    pub contract: Contract,
    pub installments: Vec<InstallmentResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractDto {
    #[validate(length(min = 1, max = 50))]
    pub contract_number: String,
    #[validate(range(min = 1))]
    pub student_id: i32,
    #[validate(range(min = 2000, max = 2030))]
    pub academic_year: i32,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContractDto {
    #[validate(length(min = 1, max = 50))]
    pub contract_number: Option<String>,
    #[validate(range(min = 2000, max = 2030))]
    pub academic_year: Option<i32>,
    pub total_amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ContractStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ContractFilterParams {
    /// Substring match against the contract number
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub student_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub academic_year: Option<i32>,
    pub status: Option<ContractStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_can_leave() {
        assert!(ContractStatus::can_transition_from(
            "ACTIVE",
            ContractStatus::Completed
        ));
        assert!(ContractStatus::can_transition_from(
            "ACTIVE",
            ContractStatus::Terminated
        ));
    }

    #[test]
    fn test_terminal_states_hold() {
        assert!(!ContractStatus::can_transition_from(
            "COMPLETED",
            ContractStatus::Active
        ));
        assert!(!ContractStatus::can_transition_from(
            "TERMINATED",
            ContractStatus::Completed
        ));
        // Setting the same status again is a no-op, not a violation
        assert!(ContractStatus::can_transition_from(
            "COMPLETED",
            ContractStatus::Completed
        ));
    }
}
