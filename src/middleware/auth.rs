use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::jwt::verify_token;
use unibase_core::AppError;

/// Extractor that validates the JWT and provides the authenticated admin's
/// claims. Approval and active-status checks live in the guard layer; this
/// extractor only proves the token is genuine.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Claims);

impl AuthAdmin {
    /// Get the admin ID from the token subject
    pub fn admin_id(&self) -> Result<i32, AppError> {
        self.0
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid admin ID in token")))
    }

    pub fn is_super_admin(&self) -> bool {
        self.0.role == "SUPER_ADMIN"
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized(anyhow::anyhow!("Missing authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Invalid authorization header format"))
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthAdmin(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "admin@test.uz".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_admin_id_parses_subject() {
        let auth = AuthAdmin(claims_with("42", "ADMIN"));
        assert_eq!(auth.admin_id().unwrap(), 42);
    }

    #[test]
    fn test_admin_id_rejects_garbage() {
        let auth = AuthAdmin(claims_with("not-a-number", "ADMIN"));
        assert!(auth.admin_id().is_err());
    }

    #[test]
    fn test_is_super_admin() {
        assert!(AuthAdmin(claims_with("1", "SUPER_ADMIN")).is_super_admin());
        assert!(!AuthAdmin(claims_with("1", "ADMIN")).is_super_admin());
    }
}
