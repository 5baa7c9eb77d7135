use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::config::jwt::JwtConfig;
use crate::config::security::SecurityConfig;
use crate::modules::admins::service::AdminService;
use crate::utils::jwt::{create_access_token, create_refresh_token, verify_refresh_token};
use unibase_core::{AppError, verify_password};

use super::model::{LoginRequest, LoginResponse, RefreshResponse};

#[derive(sqlx::FromRow)]
struct AdminAuthRow {
    id: i32,
    email: String,
    password_hash: String,
    role: String,
    is_approved: bool,
    is_active: bool,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
}

pub struct AuthService;

impl AuthService {
    /// Authenticate an admin and issue an access token plus a refresh token.
    ///
    /// Failed attempts are counted per account; reaching the configured
    /// threshold locks the account for the configured window.
    #[instrument(skip(db, dto, jwt_config, security), fields(admin.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
        security: &SecurityConfig,
    ) -> Result<(LoginResponse, String), AppError> {
        let row = sqlx::query_as::<_, AdminAuthRow>(
            "SELECT id, email, password_hash, role, is_approved, is_active,
                    failed_login_attempts, locked_until
             FROM admins WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Invalid email or password")))?;

        if let Some(locked_until) = row.locked_until
            && locked_until > Utc::now()
        {
            warn!(admin.id = %row.id, "Login attempt on locked account");
            return Err(AppError::unauthorized(anyhow::anyhow!(
                "Account is temporarily locked. Try again later."
            )));
        }

        let is_valid = verify_password(&dto.password, &row.password_hash)?;

        if !is_valid {
            let attempts = row.failed_login_attempts + 1;

            if attempts >= security.max_login_attempts {
                let locked_until = Utc::now() + Duration::minutes(security.lockout_minutes);
                sqlx::query(
                    "UPDATE admins SET failed_login_attempts = $1, locked_until = $2,
                     updated_at = NOW() WHERE id = $3",
                )
                .bind(attempts)
                .bind(locked_until)
                .bind(row.id)
                .execute(db)
                .await?;

                warn!(
                    admin.id = %row.id,
                    attempts = %attempts,
                    "Account locked after repeated failed logins"
                );
            } else {
                sqlx::query(
                    "UPDATE admins SET failed_login_attempts = $1, updated_at = NOW()
                     WHERE id = $2",
                )
                .bind(attempts)
                .bind(row.id)
                .execute(db)
                .await?;
            }

            return Err(AppError::unauthorized(anyhow::anyhow!(
                "Invalid email or password"
            )));
        }

        if !row.is_approved {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Admin account is not approved yet"
            )));
        }

        if !row.is_active {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Admin account is deactivated"
            )));
        }

        if row.failed_login_attempts > 0 || row.locked_until.is_some() {
            sqlx::query(
                "UPDATE admins SET failed_login_attempts = 0, locked_until = NULL,
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(row.id)
            .execute(db)
            .await?;
        }

        let access_token = create_access_token(row.id, &row.email, &row.role, jwt_config)?;
        let refresh_token = create_refresh_token(row.id, &row.email, jwt_config)?;

        let admin = AdminService::get_admin_by_id(db, row.id).await?;

        info!(admin.id = %row.id, "Admin logged in");

        Ok((
            LoginResponse {
                access_token,
                admin,
            },
            refresh_token,
        ))
    }

    /// Exchange a refresh token (from the HTTP-only cookie) for a new access
    /// token. The admin row is re-checked so revoked accounts cannot refresh.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<RefreshResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;

        let admin_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid admin ID in token")))?;

        let row = sqlx::query_as::<_, (String, String, bool, bool)>(
            "SELECT email, role, is_approved, is_active FROM admins WHERE id = $1",
        )
        .bind(admin_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Admin account no longer exists"))
        })?;

        let (email, role, is_approved, is_active) = row;

        if !is_approved || !is_active {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Admin account is not allowed to sign in"
            )));
        }

        let access_token = create_access_token(admin_id, &email, &role, jwt_config)?;

        Ok(RefreshResponse { access_token })
    }
}
