//! HTTP API layer with Axum routes.
//!
//! Handlers hold the engine snapshot behind one write lock (single-writer
//! semantics), apply commands as atomic snapshot transitions, and hand the
//! resulting snapshot to the store as a fire-and-forget side effect.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use warung_core::{Command, LedgerState, Receipt};
use warung_store::SnapshotStore;

use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The current ledger snapshot.
    pub ledger: Arc<RwLock<LedgerState>>,
    /// Snapshot persistence.
    pub store: Arc<dyn SnapshotStore>,
}

impl AppState {
    /// Creates application state from an initial snapshot and a store.
    #[must_use]
    pub fn new(initial: LedgerState, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(initial)),
            store,
        }
    }
}

/// Applies a command under the write lock and persists the new snapshot
/// in the background. Persistence failures are logged, never surfaced:
/// the in-memory snapshot is the source of truth.
pub(crate) async fn dispatch(
    state: &AppState,
    command: Command,
) -> Result<(LedgerState, Receipt), ApiError> {
    let mut guard = state.ledger.write().await;
    let applied = guard.apply(command)?;
    *guard = applied.state.clone();
    drop(guard);

    let store = Arc::clone(&state.store);
    let snapshot = applied.state.clone();
    tokio::spawn(async move {
        if let Err(e) = store.save(&snapshot).await {
            error!(error = %e, "failed to persist snapshot");
        }
    });
    Ok((applied.state, applied.receipt))
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
