//! File-backed key-value store implementation.
//!
//! Implements `KvStore` from `glimmer-core` with one JSON document per key
//! under `<data_dir>/store/<key>.json`. Every set rewrites the whole
//! document: the value is written to a temp file and renamed into place so
//! an interrupted write never leaves a half-written document behind.

use std::path::{Path, PathBuf};

use glimmer_core::storage::kv_store::KvStore;
use glimmer_types::error::StoreError;

/// File-backed implementation of `KvStore`.
///
/// Single-writer-per-process; no locking, no cross-process guarantee.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `<data_dir>/store`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("store"),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KvStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| StoreError::Serde(e.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let content =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::Serde(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
