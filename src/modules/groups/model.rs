use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::{deserialize_optional_bool, deserialize_optional_i32};
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub course_year: i32,
    pub faculty_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct GroupWithStats {
    pub id: i32,
    pub name: String,
    pub course_year: i32,
    pub faculty_id: i32,
    pub faculty_name: String,
    pub student_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1, max = 6))]
    pub course_year: i32,
    #[validate(range(min = 1))]
    pub faculty_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 6))]
    pub course_year: Option<i32>,
    #[validate(range(min = 1))]
    pub faculty_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GroupFilterParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub faculty_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub course_year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}
