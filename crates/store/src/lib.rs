//! Snapshot persistence for Warung.
//!
//! The engine is pure; persistence subscribes to the snapshots it
//! produces. A [`SnapshotStore`] holds exactly one [`LedgerState`] and
//! overwrites it wholesale on every save (last writer wins; cross-device
//! conflict resolution is out of scope). Two backends:
//!
//! - [`FileStore`] - a local JSON file, the offline fallback
//! - [`PostgresStore`] - a single jsonb row in a hosted Postgres database

pub mod error;
pub mod file;
pub mod postgres;

use async_trait::async_trait;
use warung_core::LedgerState;

pub use error::StoreError;
pub use file::FileStore;
pub use postgres::PostgresStore;

/// A store holding one ledger snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Loads the stored snapshot, if any.
    async fn load(&self) -> Result<Option<LedgerState>, StoreError>;

    /// Overwrites the stored snapshot.
    async fn save(&self, state: &LedgerState) -> Result<(), StoreError>;
}
