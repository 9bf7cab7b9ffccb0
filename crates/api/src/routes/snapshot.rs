//! Snapshot route: the repository's `loadAll` surface.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use warung_core::LedgerState;

use crate::AppState;

/// Creates the snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/snapshot", get(snapshot))
}

async fn snapshot(State(state): State<AppState>) -> Json<LedgerState> {
    let ledger = state.ledger.read().await;
    Json(ledger.clone())
}
