//! Service entry point.

use dotenvy::dotenv;
use fundmgr::{config, core, errors::Result, http};
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application settings
    let settings = config::Settings::load()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Initialize the database
    let db = config::database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to {}: {e}", settings.database_url))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed the built-in admin and guest accounts
    core::user::seed_default_users(&db).await?;

    // 6. Drop stale sessions from previous runs
    let purged = core::session::purge_expired(&db).await?;
    if purged > 0 {
        info!("Purged {purged} expired sessions");
    }

    // 7. Serve
    http::run_server(settings, db).await
}
