//! API route definitions.

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::ApiError;
use crate::AppState;

pub mod batches;
pub mod health;
pub mod loans;
pub mod orders;
pub mod productions;
pub mod sales;
pub mod snapshot;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(batches::routes())
        .merge(productions::routes())
        .merge(sales::routes())
        .merge(orders::routes())
        .merge(loans::routes())
        .merge(transactions::routes())
        .merge(snapshot::routes())
}

/// Resolves an optional epoch-milliseconds timestamp, defaulting to now.
pub(crate) fn timestamp(millis: Option<i64>) -> Result<DateTime<Utc>, ApiError> {
    match millis {
        Some(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| ApiError::bad_request(format!("invalid timestamp: {ms}"))),
        None => Ok(Utc::now()),
    }
}

/// Resolves an epoch-milliseconds timestamp that must be present.
pub(crate) fn required_timestamp(millis: i64) -> Result<DateTime<Utc>, ApiError> {
    timestamp(Some(millis))
}
