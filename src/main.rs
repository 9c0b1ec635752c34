//! CartWheel server binary: wires configuration, database, notifier, and
//! the HTTP API together.

use cartwheel::{
    api::{self, AppState},
    config::{AppConfig, database},
    errors::Result,
    notify::LogNotifier,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
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

    // 3. Load the application configuration
    let config = AppConfig::load_default()?;
    info!(bind = %config.server.bind, "loaded application configuration");

    // 4. Connect to the database and bring the schema up
    let db = database::create_connection(&config.database.url).await?;
    database::create_tables(&db).await?;
    info!("database initialized");

    // 5. Construct the notification client here, at the process entry point,
    //    and inject it; checkout never reaches for a global.
    let notifier = Arc::new(LogNotifier::new(config.notifications.clone()));

    // 6. Serve the API
    let state = AppState { db, notifier };
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %config.server.bind, "cartwheel listening");
    axum::serve(listener, app).await?;

    Ok(())
}
