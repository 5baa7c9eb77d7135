use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::{deserialize_optional_bool, deserialize_optional_i32};
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Scholarship {
    pub id: i32,
    pub student_id: i32,
    pub scholarship_type: String,
    pub percentage: i32,
    pub academic_year: i32,
    pub monthly_amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScholarshipType {
    Full,
    Partial,
    Merit,
    Social,
}

impl ScholarshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScholarshipType::Full => "FULL",
            ScholarshipType::Partial => "PARTIAL",
            ScholarshipType::Merit => "MERIT",
            ScholarshipType::Social => "SOCIAL",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateScholarshipDto {
    #[validate(range(min = 1))]
    pub student_id: i32,
    pub scholarship_type: ScholarshipType,
    #[validate(range(min = 0, max = 100))]
    pub percentage: i32,
    #[validate(range(min = 2000, max = 2030))]
    pub academic_year: i32,
    pub monthly_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateScholarshipDto {
    pub scholarship_type: Option<ScholarshipType>,
    #[validate(range(min = 0, max = 100))]
    pub percentage: Option<i32>,
    #[validate(range(min = 2000, max = 2030))]
    pub academic_year: Option<i32>,
    pub monthly_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ScholarshipFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub student_id: Option<i32>,
    pub scholarship_type: Option<ScholarshipType>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub academic_year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}
