//! Portfolio API server binary.

use std::time::Duration;

use portfolio_api::config::Config;
use portfolio_api::error::{Error, Result};
use portfolio_api::http::{create_router, AppState};
use portfolio_api::{database, telemetry, ExpiredDeletion};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_level);

    let db = database::connect(&config).await?;

    #[cfg(feature = "migration")]
    {
        use portfolio_api::migration::{Migrator, MigratorTrait};
        Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    let state = AppState::new(&config, db)?;

    let store = state.gateway.store().clone();
    let cleanup_interval = Duration::from_secs(config.session_cleanup_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            if let Err(e) = store.delete_expired().await {
                error!(error = %e, "expired session cleanup failed");
            }
        }
    });

    let app = create_router(state);
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| Error::Internal(format!("failed to bind {}: {e}", config.bind_address)))?;
    info!(address = %config.bind_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Internal(format!("server error: {e}")))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
