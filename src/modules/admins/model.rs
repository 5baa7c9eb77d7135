use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use unibase_core::serde::deserialize_optional_bool;
use unibase_core::{PaginationParams, SortParams};

/// Columns safe to expose; the password hash and lockout bookkeeping never
/// leave the service layer.
pub const ADMIN_COLUMNS: &str =
    "id, full_name, email, phone, role, is_approved, is_active, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "SUPER_ADMIN",
            AdminRole::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminDto {
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub role: Option<AdminRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAdminDto {
    #[validate(length(min = 1, max = 150))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AdminFilterParams {
    /// Substring match against full name and email
    pub search: Option<String>,
    pub role: Option<AdminRole>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_approved: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub sort: SortParams,
}
