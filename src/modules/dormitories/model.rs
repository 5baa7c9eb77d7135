use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::{deserialize_optional_bool, deserialize_optional_i32};
use unibase_core::{PaginationParams, SortParams};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Dormitory {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DormitoryRoom {
    pub id: i32,
    pub dormitory_id: i32,
    pub room_number: String,
    pub floor: i32,
    pub beds_count: i32,
    pub monthly_fee: Decimal,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room view with derived occupancy. Occupied beds are counted from the
/// students table, never stored.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct RoomWithOccupancy {
    pub id: i32,
    pub dormitory_id: i32,
    pub room_number: String,
    pub floor: i32,
    pub beds_count: i32,
    pub monthly_fee: Decimal,
    pub is_available: bool,
    pub occupied_beds: i64,
    pub free_beds: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct DormitoryStats {
    pub id: i32,
    pub name: String,
    pub total_rooms: i64,
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDormitoryDto {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDormitoryDto {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DormitoryFilterParams {
    /// Substring match against name and address
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomDto {
    #[validate(length(min = 1, max = 20))]
    pub room_number: String,
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub beds_count: i32,
    pub monthly_fee: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomDto {
    #[validate(length(min = 1, max = 20))]
    pub room_number: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub beds_count: Option<i32>,
    pub monthly_fee: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct RoomFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub floor: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_available: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignStudentDto {
    #[validate(range(min = 1))]
    pub student_id: i32,
}
