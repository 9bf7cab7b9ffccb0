//! Warung API Server
//!
//! Main entry point for the Warung backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warung_api::{create_router, AppState};
use warung_shared::config::PersistenceBackend;
use warung_shared::AppConfig;
use warung_store::{FileStore, PostgresStore, SnapshotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warung=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Select the snapshot store
    let store: Arc<dyn SnapshotStore> = match config.persistence.backend {
        PersistenceBackend::File => {
            info!(path = %config.persistence.snapshot_path, "using file snapshot store");
            Arc::new(FileStore::new(&config.persistence.snapshot_path))
        }
        PersistenceBackend::Postgres => {
            let url = config
                .persistence
                .database_url
                .as_deref()
                .context("persistence.database_url required for the postgres backend")?;
            Arc::new(PostgresStore::connect(url).await?)
        }
    };

    // Load the last snapshot (a fresh install starts empty)
    let initial = store.load().await?.unwrap_or_default();
    info!(
        batches = initial.batches.len(),
        transactions = initial.transactions.len(),
        "ledger snapshot loaded"
    );

    // Create application state and router
    let state = AppState::new(initial, store);
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
