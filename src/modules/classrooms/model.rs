use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::{deserialize_optional_bool, deserialize_optional_i32};
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: i32,
    pub name: String,
    pub building: String,
    pub floor: i32,
    pub capacity: i32,
    pub classroom_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassroomType {
    Lecture,
    Lab,
    Seminar,
}

impl ClassroomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassroomType::Lecture => "LECTURE",
            ClassroomType::Lab => "LAB",
            ClassroomType::Seminar => "SEMINAR",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub building: String,
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 500))]
    pub capacity: i32,
    pub classroom_type: Option<ClassroomType>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassroomDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub building: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 500))]
    pub capacity: Option<i32>,
    pub classroom_type: Option<ClassroomType>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ClassroomFilterParams {
    /// Substring match against name and building
    pub search: Option<String>,
    pub building: Option<String>,
    pub classroom_type: Option<ClassroomType>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub min_capacity: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub max_capacity: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}
