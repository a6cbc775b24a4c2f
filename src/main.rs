use expense_manager::{
    config::{database, settings},
    core::session,
    errors::Result,
    seed,
    server::{self, AppState},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml and environment overrides
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connected successfully."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured categories and drop stale sessions
    seed::seed_categories(&db, &settings.categories.seed)
        .await
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;
    session::purge_expired_sessions(&db).await?;

    // 6. `expense-manager seed` loads demo data and exits
    if env::args().nth(1).as_deref() == Some("seed") {
        let demo = seed::seed_demo_data(&db)
            .await
            .inspect_err(|e| error!("Failed to seed demo data: {}", e))?;
        info!("Demo account: {} / {}", demo.email, seed::DEMO_PASSWORD);
        return Ok(());
    }

    // 7. Serve HTTP
    server::run_server(AppState::new(db, settings)).await
}
