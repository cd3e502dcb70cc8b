// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quiz_backend::{
    config::Config,
    models::user::ROLE_ADMIN,
    routes,
    state::AppState,
    store::{DynStore, MemoryStore, PgStore, QuizStore},
    utils::password::hash_password,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store = connect_store(&config).await?;

    if let Err(e) = seed_admin_user(store.as_ref(), &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    let app = routes::create_router(AppState::new(store, config.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects to Postgres (retrying while it starts up) and applies migrations,
/// or builds the in-memory store for `DATABASE_URL=memory://`.
async fn connect_store(config: &Config) -> Result<DynStore, Box<dyn std::error::Error>> {
    if config.uses_memory_store() {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    return Err(format!(
                        "Failed to connect to database after 5 retries: {}",
                        e
                    )
                    .into());
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    Ok(Arc::new(PgStore::new(pool)))
}

async fn seed_admin_user(
    store: &dyn QuizStore,
    config: &Config,
) -> Result<(), quiz_backend::error::AppError> {
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        if store.find_user_by_username(username).await?.is_none() {
            tracing::info!("Seeding admin user: {}", username);
            let hashed_password = hash_password(password)?;
            store
                .create_user(username, &hashed_password, ROLE_ADMIN)
                .await?;
            tracing::info!("Admin user created successfully.");
        }
    }
    Ok(())
}
