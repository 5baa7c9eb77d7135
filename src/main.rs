use dotenvy::dotenv;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use unibase::config::security::SecurityConfig;
use unibase::router::init_router;
use unibase::state::init_app_state;
use unibase_core::hash_password;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // Check if this is a CLI command
    if args.len() > 1 && args[1] == "create-admin" {
        handle_create_admin(args).await;
        return;
    }

    // Normal server startup
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format!(
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}

/// Bootstrap command: creates the first approved super admin directly in the
/// database. Regular admin accounts are created through the API afterwards.
async fn handle_create_admin(args: Vec<String>) {
    if args.len() != 5 {
        eprintln!(
            "Usage: {} create-admin <full_name> <email> <password>",
            args[0]
        );
        std::process::exit(1);
    }

    let full_name = &args[2];
    let email = &args[3];
    let password = &args[4];

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let security = SecurityConfig::from_env();
    let password_hash = match hash_password(password, security.bcrypt_cost) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("❌ Error hashing password: {}", e.error);
            std::process::exit(1);
        }
    };

    let result = sqlx::query(
        "INSERT INTO admins (full_name, email, password_hash, role, is_approved, is_active)
         VALUES ($1, $2, $3, 'SUPER_ADMIN', TRUE, TRUE)",
    )
    .bind(full_name)
    .bind(email)
    .bind(&password_hash)
    .execute(&pool)
    .await;

    match result {
        Ok(_) => {
            println!("✅ Super admin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {}", full_name);
        }
        Err(e) => {
            eprintln!("❌ Error creating super admin: {}", e);
            std::process::exit(1);
        }
    }
}
