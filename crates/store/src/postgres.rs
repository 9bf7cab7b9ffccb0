//! Hosted Postgres snapshot store.
//!
//! The snapshot lives in a single jsonb row; every save overwrites it
//! (last writer wins). The table is created at connect time, so a fresh
//! database needs no separate migration step.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use warung_core::LedgerState;

use crate::{SnapshotStore, StoreError};

const INIT_SQL: &str = r"
CREATE TABLE IF NOT EXISTS ledger_snapshots (
    id          smallint PRIMARY KEY CHECK (id = 1),
    payload     jsonb NOT NULL,
    updated_at  timestamptz NOT NULL DEFAULT now()
)";

/// Snapshot store backed by a hosted Postgres database.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects to the database and ensures the snapshot table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or table creation fails.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::query(INIT_SQL).execute(&pool).await?;
        info!("connected to snapshot database");
        Ok(Self { pool })
    }

    /// Creates a store from an existing pool (the table must exist).
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PostgresStore {
    async fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT payload FROM ledger_snapshots WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        match row {
            Some((payload,)) => Ok(Some(serde_json::from_value(payload)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        let payload = serde_json::to_value(state)?;
        sqlx::query(
            "INSERT INTO ledger_snapshots (id, payload, updated_at)
             VALUES (1, $1, now())
             ON CONFLICT (id) DO UPDATE
             SET payload = EXCLUDED.payload, updated_at = now()",
        )
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
