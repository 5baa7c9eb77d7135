use crate::errors::AppError;

/// Reject non-positive primary keys before they reach a query.
pub fn validate_id(id: i32) -> Result<(), AppError> {
    if id < 1 {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "ID must be a positive integer"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1).is_ok());
        assert!(validate_id(i32::MAX).is_ok());
        assert_eq!(validate_id(0).unwrap_err().status, StatusCode::BAD_REQUEST);
        assert_eq!(validate_id(-5).unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
