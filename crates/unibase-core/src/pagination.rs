use axum::http::StatusCode;
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use crate::errors::AppError;

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Page-based pagination query parameters shared by every list endpoint.
///
/// Defaults to page 1 with 10 rows; `limit` is capped at 100.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
        }
    }
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1).min(100)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sorting query parameters. `sort_by` is validated against each module's
/// allow-listed column set before being spliced into SQL.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SortParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl SortParams {
    /// Build an `ORDER BY` clause restricted to `allowed` columns.
    ///
    /// An unknown `sort_by` value is a client error, not a fallback.
    pub fn order_clause(&self, allowed: &[&str], default: &str) -> Result<String, AppError> {
        let column = match &self.sort_by {
            Some(col) => {
                if !allowed.contains(&col.as_str()) {
                    return Err(AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow::anyhow!(
                            "Cannot sort by '{}'. Sortable columns: {}",
                            col,
                            allowed.join(", ")
                        ),
                    ));
                }
                col.as_str()
            }
            None => default,
        };

        let order = self.sort_order.unwrap_or(SortOrder::Desc).as_sql();

        Ok(format!(" ORDER BY {} {}", column, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_capped_at_100() {
        let params = PaginationParams {
            page: Some(1),
            limit: Some(500),
        };
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn test_limit_floor_is_one() {
        let params = PaginationParams {
            page: Some(1),
            limit: Some(0),
        };
        assert_eq!(params.limit(), 1);

        let params = PaginationParams {
            page: Some(1),
            limit: Some(-5),
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_negative_page_clamped() {
        let params = PaginationParams {
            page: Some(-2),
            limit: Some(10),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_empty_strings() {
        let params: PaginationParams = serde_json::from_str(r#"{"page":"","limit":""}"#).unwrap();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_deserialize_string_values() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"2","limit":"25"}"#).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 25);
    }

    #[test]
    fn test_order_clause_default() {
        let sort = SortParams::default();
        let clause = sort.order_clause(&["id", "name"], "created_at").unwrap();
        assert_eq!(clause, " ORDER BY created_at DESC");
    }

    #[test]
    fn test_order_clause_allowed_column() {
        let sort = SortParams {
            sort_by: Some("name".to_string()),
            sort_order: Some(SortOrder::Asc),
        };
        let clause = sort.order_clause(&["id", "name"], "created_at").unwrap();
        assert_eq!(clause, " ORDER BY name ASC");
    }

    #[test]
    fn test_order_clause_rejects_unknown_column() {
        let sort = SortParams {
            sort_by: Some("password_hash; DROP TABLE admins".to_string()),
            sort_order: None,
        };
        let err = sort.order_clause(&["id", "name"], "id").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_sort_order_deserialize_uppercase() {
        let order: SortOrder = serde_json::from_str(r#""ASC""#).unwrap();
        assert_eq!(order, SortOrder::Asc);
        let order: SortOrder = serde_json::from_str(r#""DESC""#).unwrap();
        assert_eq!(order, SortOrder::Desc);
    }
}
