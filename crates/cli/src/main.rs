//! Connects to the database, applies migrations and verifies that every
//! declared entity has its table.

mod config;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskforge_db::SchemaRegistry;

use config::SchemaConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskforge_cli=debug,taskforge_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = SchemaConfig::from_env()?;
    tracing::info!(
        max_connections = config.max_connections,
        run_migrations = config.run_migrations,
        "Loaded schema configuration"
    );

    // --- Database ---
    let pool = taskforge_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    taskforge_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    if config.run_migrations {
        taskforge_db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    // --- Registry ---
    let registry = SchemaRegistry::declare(&pool);

    let missing = registry.missing_tables().await?;
    if !missing.is_empty() {
        tracing::error!(?missing, "Declared tables absent from the database");
        bail!("{} declared table(s) missing: {}", missing.len(), missing.join(", "));
    }

    for (name, handle) in registry.iter() {
        let rows = handle.count().await?;
        tracing::debug!(entity = %name, table = handle.table(), rows, "Entity declared");
    }

    tracing::info!(entities = registry.len(), "Schema verified");
    pool.close().await;
    Ok(())
}
