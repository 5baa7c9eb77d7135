use sqlx::PgPool;
use uuid::Uuid;

use unibase_core::hash_password;

// Low bcrypt cost keeps the test suite fast; the cost is embedded in the
// hash, so verification works regardless of the server's configured cost.
const TEST_BCRYPT_COST: u32 = 4;

#[allow(dead_code)]
pub struct TestAdmin {
    pub id: i32,
    pub email: String,
    pub password: String,
}

/// Create an approved, active admin ready to log in.
pub async fn create_test_admin(pool: &PgPool, email: &str, password: &str, role: &str) -> TestAdmin {
    let hashed = hash_password(password, TEST_BCRYPT_COST).unwrap();

    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO admins (full_name, email, password_hash, role, is_approved, is_active)
         VALUES ('Test Admin', $1, $2, $3, TRUE, TRUE)
         RETURNING id",
    )
    .bind(email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestAdmin {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.uz", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4())
}
