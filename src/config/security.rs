use std::env;

/// Account-security knobs: bcrypt work factor, login lockout thresholds,
/// and refresh-cookie attributes. All externally supplied; the defaults
/// are development values.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
    pub max_login_attempts: i32,
    pub lockout_minutes: i64,
    pub refresh_cookie_domain: Option<String>,
    pub refresh_cookie_secure: bool,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12),
            max_login_attempts: env::var("MAX_LOGIN_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            lockout_minutes: env::var("LOCKOUT_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_cookie_domain: env::var("REFRESH_COOKIE_DOMAIN").ok(),
            refresh_cookie_secure: env::var("REFRESH_COOKIE_SECURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }
}
