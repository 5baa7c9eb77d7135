use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::{deserialize_optional_bool, deserialize_optional_i32};
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub passport_series: String,
    /// 14-digit personal identification number
    pub jshshir: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub group_id: i32,
    pub faculty_id: i32,
    pub dormitory_room_id: Option<i32>,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detail view with the group, faculty, and dormitory room eager-loaded.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct StudentWithRelations {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub passport_series: String,
    pub jshshir: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub group_id: i32,
    pub group_name: String,
    pub faculty_id: i32,
    pub faculty_name: String,
    pub dormitory_room_id: Option<i32>,
    pub dormitory_room_number: Option<String>,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(length(min = 5, max = 9))]
    pub passport_series: String,
    #[validate(length(equal = 14))]
    pub jshshir: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[validate(range(min = 1))]
    pub group_id: i32,
    #[validate(range(min = 1))]
    pub faculty_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(length(min = 5, max = 9))]
    pub passport_series: Option<String>,
    #[validate(length(equal = 14))]
    pub jshshir: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[validate(range(min = 1))]
    pub group_id: Option<i32>,
    #[validate(range(min = 1))]
    pub faculty_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct StudentFilterParams {
    /// Substring match against names, passport series, and JSHSHIR
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub group_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub faculty_id: Option<i32>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    pub min_balance: Option<Decimal>,
    pub max_balance: Option<Decimal>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}
