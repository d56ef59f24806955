//! Database connection setup.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// Connect to the configured database with the application's pool settings.
pub async fn connect(config: &Config) -> Result<DatabaseConnection> {
    let url = with_ssl_mode(&config.database_url, config.database_ssl);

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(config.database_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(10 * 60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(
        max_connections = config.database_max_connections,
        "connected to database"
    );
    Ok(db)
}

/// Check that the database answers.
pub async fn ping(db: &DatabaseConnection) -> Result<()> {
    db.ping().await.map_err(|e| {
        warn!(error = %e, "database ping failed");
        Error::Unavailable("Database is not available".to_string())
    })
}

/// Append `sslmode=require` to Postgres URLs that do not already pin a mode.
fn with_ssl_mode(url: &str, ssl: bool) -> String {
    let is_postgres = url.starts_with("postgres://") || url.starts_with("postgresql://");
    if !ssl || !is_postgres || url.contains("sslmode=") {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}sslmode=require")
}
