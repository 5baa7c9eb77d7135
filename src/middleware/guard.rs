//! Admin guard layers.
//!
//! Every data route sits behind [`require_admin`]: the caller must present a
//! valid token AND the matching admin row must still be approved and active.
//! The row is re-checked on every request so that deactivating an admin takes
//! effect immediately, not at token expiry.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use crate::middleware::auth::AuthAdmin;
use crate::state::AppState;
use unibase_core::AppError;

async fn check_admin_account(
    db: &PgPool,
    auth: &AuthAdmin,
) -> Result<(), AppError> {
    let admin_id = auth.admin_id()?;

    let row = sqlx::query_as::<_, (bool, bool)>(
        "SELECT is_approved, is_active FROM admins WHERE id = $1",
    )
    .bind(admin_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Admin account no longer exists")))?;

    let (is_approved, is_active) = row;

    if !is_approved {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Admin account is not approved yet"
        )));
    }

    if !is_active {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Admin account is deactivated"
        )));
    }

    Ok(())
}

async fn guard(state: AppState, req: Request, next: Next) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_admin = AuthAdmin::from_request_parts(&mut parts, &state).await?;

    check_admin_account(&state.db, &auth_admin).await?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Layer for routes any approved, active admin may call.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match guard(state, req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Handler-level check for operations reserved to super administrators.
pub fn ensure_super(auth: &AuthAdmin) -> Result<(), AppError> {
    if !auth.is_super_admin() {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. Super administrator privileges required."
        )));
    }

    Ok(())
}

/// Ownership check for admin-profile routes: the caller must be the admin
/// being addressed, or a super admin.
pub fn ensure_self_or_super(auth: &AuthAdmin, target_admin_id: i32) -> Result<(), AppError> {
    if auth.is_super_admin() {
        return Ok(());
    }

    if auth.admin_id()? != target_admin_id {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. You can only manage your own account."
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::Claims;

    fn auth_with(sub: &str, role: &str) -> AuthAdmin {
        AuthAdmin(Claims {
            sub: sub.to_string(),
            email: "admin@test.uz".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_super_admin_passes_ownership_check() {
        let auth = auth_with("1", "SUPER_ADMIN");
        assert!(ensure_self_or_super(&auth, 99).is_ok());
    }

    #[test]
    fn test_self_passes_ownership_check() {
        let auth = auth_with("7", "ADMIN");
        assert!(ensure_self_or_super(&auth, 7).is_ok());
    }

    #[test]
    fn test_other_admin_fails_ownership_check() {
        let auth = auth_with("7", "ADMIN");
        let err = ensure_self_or_super(&auth, 8).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_ensure_super() {
        assert!(ensure_super(&auth_with("1", "SUPER_ADMIN")).is_ok());
        let err = ensure_super(&auth_with("1", "ADMIN")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }
}
