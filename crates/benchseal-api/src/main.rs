//! # benchseal-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects the Postgres store
//! when `DATABASE_URL` is set, and serves the Axum router.

use std::sync::Arc;

use benchseal_api::db::{self, PgSubmissionStore};
use benchseal_api::state::{AppConfig, AppState, LogFormat};
use benchseal_registry::{MemorySubmissionStore, SubmissionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let pool = db::init_pool(config.database_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;
    let store: Arc<dyn SubmissionStore> = match pool {
        Some(pool) => Arc::new(PgSubmissionStore::new(pool)),
        None => Arc::new(MemorySubmissionStore::new()),
    };

    tracing::info!(
        policy = ?config.reveal_policy,
        max_batch_entries = config.max_batch_entries,
        metrics = config.metrics_enabled,
        auth = config.auth_token.is_some(),
        "configuration loaded"
    );

    let port = config.port;
    let app = benchseal_api::app(AppState::new(config, store));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("benchseal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
