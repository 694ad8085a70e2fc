//! DAO backend - Main entry point.
//!
//! Serves the HTTP API (`serve`, the default) or manages the database schema
//! (`db create|drop|seed|setup`).

use clap::Parser;
use dao_backend::config::{Command, Config};
use dao_backend::db::Database;
use dao_backend::{server, setup};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Missing .env is fine, the environment may be set directly
    dotenv::dotenv().ok();

    let config = Config::parse();
    init_tracing(&config);

    let command = config.command();
    info!(
        command = ?command,
        "Starting dao-backend v{}",
        env!("CARGO_PKG_VERSION")
    );

    let settings = config.database_settings()?;
    let db = Arc::new(Database::connect(&settings).await?);

    let result = match &command {
        Command::Serve => server::serve(&config, db.clone()).await,
        Command::Db { action } => setup::run_db_action(db.clone(), action)
            .await
            .map_err(Into::into),
    };

    info!("Closing database connections");
    db.close().await;

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
