//! Serde helpers for query-string deserialization.
//!
//! Filter structs flatten `PaginationParams`/`SortParams`, which makes serde
//! buffer every query value as a string. Numeric and boolean filter fields
//! therefore parse from strings explicitly; empty strings read as absent.

use ::serde::de::Error as DeError;
use ::serde::{Deserialize, Deserializer};

pub fn deserialize_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i32>().map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<bool>().map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, ::serde::Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "deserialize_optional_i32")]
        faculty_id: Option<i32>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        is_active: Option<bool>,
    }

    #[test]
    fn test_parses_string_values() {
        let f: Filters =
            serde_json::from_str(r#"{"faculty_id":"7","is_active":"true"}"#).unwrap();
        assert_eq!(f.faculty_id, Some(7));
        assert_eq!(f.is_active, Some(true));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let f: Filters = serde_json::from_str(r#"{"faculty_id":"","is_active":""}"#).unwrap();
        assert_eq!(f.faculty_id, None);
        assert_eq!(f.is_active, None);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(serde_json::from_str::<Filters>(r#"{"faculty_id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<Filters>(r#"{"is_active":"maybe"}"#).is_err());
    }
}
