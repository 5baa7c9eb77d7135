use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::middleware::auth::AuthAdmin;
use crate::modules::admins::model::Admin;
use crate::modules::admins::service::AdminService;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse, RefreshResponse};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;
use unibase_core::AppError;

pub const REFRESH_COOKIE: &str = "refresh_token";

fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut builder = Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .path("/api/auth")
        .same_site(SameSite::Strict)
        .secure(state.security_config.refresh_cookie_secure);

    if let Some(domain) = &state.security_config.refresh_cookie_domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, "");
    cookie.set_path("/api/auth");
    cookie
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or account locked"),
        (status = 403, description = "Account not approved or deactivated")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (response, refresh_token) = AuthService::login(
        &state.db,
        dto,
        &state.jwt_config,
        &state.security_config,
    )
    .await?;

    let jar = jar.add(refresh_cookie(&state, refresh_token));

    Ok((jar, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 401, description = "Missing, invalid, or expired refresh token")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Missing refresh token cookie")))?;

    let response = AuthService::refresh(&state.db, &token, &state.jwt_config).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Refresh cookie cleared", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(removal_cookie());

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated admin profile", body = Admin),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth))]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthAdmin,
) -> Result<Json<Admin>, AppError> {
    let admin = AdminService::get_admin_by_id(&state.db, auth.admin_id()?).await?;

    Ok(Json(admin))
}
