use unibase::config::jwt::JwtConfig;
use unibase::utils::jwt::{
    create_access_token, create_refresh_token, verify_refresh_token, verify_token,
};

fn test_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    }
}

#[test]
fn test_access_token_roundtrip() {
    let config = test_config();

    let token = create_access_token(42, "admin@test.uz", "ADMIN", &config).unwrap();
    let claims = verify_token(&token, &config).unwrap();

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.email, "admin@test.uz");
    assert_eq!(claims.role, "ADMIN");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_wrong_secret_rejected() {
    let config = test_config();
    let token = create_access_token(42, "admin@test.uz", "ADMIN", &config).unwrap();

    let other = JwtConfig {
        secret: "different-secret".to_string(),
        ..test_config()
    };

    assert!(verify_token(&token, &other).is_err());
}

#[test]
fn test_expired_token_rejected() {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use unibase::modules::auth::model::Claims;

    let config = test_config();
    let now = chrono::Utc::now().timestamp() as usize;

    // Hand-rolled token that expired an hour ago
    let claims = Claims {
        sub: "42".to_string(),
        email: "admin@test.uz".to_string(),
        role: "ADMIN".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    assert!(verify_token(&token, &config).is_err());
}

#[test]
fn test_refresh_token_roundtrip_with_unique_jti() {
    let config = test_config();

    let first = create_refresh_token(42, "admin@test.uz", &config).unwrap();
    let second = create_refresh_token(42, "admin@test.uz", &config).unwrap();

    let first_claims = verify_refresh_token(&first, &config).unwrap();
    let second_claims = verify_refresh_token(&second, &config).unwrap();

    assert_eq!(first_claims.sub, "42");
    assert_ne!(first_claims.jti, second_claims.jti);
}

#[test]
fn test_refresh_token_not_valid_as_access_token_claims() {
    let config = test_config();
    let refresh = create_refresh_token(42, "admin@test.uz", &config).unwrap();

    // Access claims lack `jti`, refresh claims lack `role`; the decode into
    // access Claims must fail on the missing field
    assert!(verify_token(&refresh, &config).is_err());
}
