mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{create_test_admin, generate_unique_email};
use unibase::config::cors::CorsConfig;
use unibase::config::jwt::JwtConfig;
use unibase::config::security::SecurityConfig;
use unibase::router::init_router;
use unibase::state::AppState;

fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        security_config: SecurityConfig::from_env(),
    };
    init_router(state)
}

async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));

    let request = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            builder
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_faculty_lifecycle_end_to_end(pool: PgPool) {
    let email = generate_unique_email();
    create_test_admin(&pool, &email, "testpass123", "SUPER_ADMIN").await;

    let token = get_auth_token(setup_test_app(pool.clone()), &email, "testpass123").await;

    // Create
    let (status, body) = send_json(
        setup_test_app(pool.clone()),
        "POST",
        "/api/faculties",
        &token,
        Some(json!({"name": "Engineering", "code": "ENG"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let faculty_id = body["id"].as_i64().unwrap();

    // Duplicate name conflicts
    let (status, _) = send_json(
        setup_test_app(pool.clone()),
        "POST",
        "/api/faculties",
        &token,
        Some(json!({"name": "Engineering", "code": "ENG2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Case-insensitive search finds it
    let (status, body) = send_json(
        setup_test_app(pool.clone()),
        "GET",
        "/api/faculties?search=engin",
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Engineering");

    // A department blocks deletion
    let (status, dept) = send_json(
        setup_test_app(pool.clone()),
        "POST",
        "/api/departments",
        &token,
        Some(json!({"name": "Software Engineering", "faculty_id": faculty_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/faculties/{}", faculty_id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Remove the department, then deletion succeeds with a message
    let (status, _) = send_json(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/departments/{}", dept["id"].as_i64().unwrap()),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/faculties/{}", faculty_id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Faculty deleted successfully");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_requests_without_token_rejected(pool: PgPool) {
    let request = Request::builder()
        .method("GET")
        .uri("/api/faculties")
        .body(Body::empty())
        .unwrap();

    let response = setup_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unapproved_admin_cannot_login(pool: PgPool) {
    let email = generate_unique_email();
    let hashed = unibase_core::hash_password("testpass123", 4).unwrap();
    sqlx::query(
        "INSERT INTO admins (full_name, email, password_hash, role, is_approved, is_active)
         VALUES ('Pending Admin', $1, $2, 'ADMIN', FALSE, TRUE)",
    )
    .bind(&email)
    .bind(&hashed)
    .execute(&pool)
    .await
    .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({"email": email, "password": "testpass123"})).unwrap(),
        ))
        .unwrap();

    let response = setup_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_id_is_bad_request(pool: PgPool) {
    let email = generate_unique_email();
    create_test_admin(&pool, &email, "testpass123", "SUPER_ADMIN").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &email, "testpass123").await;

    let (status, _) = send_json(
        setup_test_app(pool.clone()),
        "GET",
        "/api/faculties/0",
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
