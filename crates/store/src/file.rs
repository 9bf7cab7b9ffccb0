//! Local JSON file store.
//!
//! The offline fallback: the whole snapshot is serialized to one pretty
//! JSON file. Writes go through a sibling temp file and a rename so a
//! crash mid-write cannot corrupt the previous snapshot.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use warung_core::LedgerState;

use crate::{SnapshotStore, StoreError};

/// Snapshot store backed by a local JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store writing to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("warung-store-test-{}.json", Uuid::now_v7()))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let store = FileStore::new(temp_path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let path = temp_path();
        let store = FileStore::new(path.clone());

        let state = LedgerState::default();
        store.save(&state).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let path = temp_path();
        let store = FileStore::new(path.clone());

        store.save(&LedgerState::default()).await.unwrap();
        let changed = LedgerState {
            next_seq: 42,
            ..Default::default()
        };
        store.save(&changed).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.next_seq, 42);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
