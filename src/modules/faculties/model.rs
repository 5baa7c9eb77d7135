use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::deserialize_optional_bool;
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Faculty {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFacultyDto {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFacultyDto {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct FacultyFilterParams {
    /// Substring match against name and code
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct FacultyStats {
    pub id: i32,
    pub name: String,
    pub total_departments: i64,
    pub total_groups: i64,
    pub total_students: i64,
}
