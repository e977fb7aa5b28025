//! Database bootstrap for the rental core.
//!
//! Loads configuration, connects and applies pending migrations. The HTTP
//! surface is mounted by the host application; this binary only prepares
//! the schema it runs on.

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use moto_rental::infrastructure::database::migrator::Migrator;
use moto_rental::{default_config_path, init_database, AppConfig, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("MOTO_RENTAL_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());

    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let db = init_database(&db_config).await?;
    Migrator::up(&db, None).await?;
    info!("Migrations applied, schema is up to date");

    Ok(())
}
