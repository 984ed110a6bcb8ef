//! Key-value store trait.
//!
//! Defines the interface for the persisted local state: the session
//! collection, the current-session pointer, and the API credential -- each
//! an independently-keyed JSON document. Implementations live in
//! glimmer-infra.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use glimmer_types::error::StoreError;

/// Trait for persistent key-value storage of JSON documents.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Single-writer-per-process assumption; implementations need no locking
/// and give no cross-process consistency guarantee.
pub trait KvStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Set the value for a key (upsert, whole-document rewrite).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Read and decode a value, falling back to `default` on any failure.
///
/// A missing key, an unreadable entry, and an undecodable document all
/// yield the caller's default. Failures are logged, never propagated.
pub async fn read_or_default<T, K>(store: &K, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    K: KvStore,
{
    match store.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(key, error = %err, "undecodable store entry, using default");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            warn!(key, error = %err, "failed to read store entry, using default");
            default
        }
    }
}

/// Serialize and store a value under a key.
///
/// A value that serializes to JSON null removes the key instead of
/// persisting a null marker.
pub async fn write_value<T, K>(store: &K, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    K: KvStore,
{
    let json = serde_json::to_value(value).map_err(|e| StoreError::Serde(e.to_string()))?;
    if json.is_null() {
        store.remove(key).await
    } else {
        store.set(key, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, serde_json::Value>>,
    }

    impl KvStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_read_or_default_missing_key() {
        let store = MemoryStore::default();
        let value: Vec<String> = read_or_default(&store, "missing", Vec::new()).await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_read_or_default_decodes_stored_value() {
        let store = MemoryStore::default();
        store.set("names", &json!(["a", "b"])).await.unwrap();
        let value: Vec<String> = read_or_default(&store, "names", Vec::new()).await;
        assert_eq!(value, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_read_or_default_corrupt_entry_yields_default() {
        let store = MemoryStore::default();
        // A string where a list is expected
        store.set("names", &json!("not a list")).await.unwrap();
        let value: Vec<String> = read_or_default(&store, "names", vec!["d".to_string()]).await;
        assert_eq!(value, vec!["d"]);
    }

    #[tokio::test]
    async fn test_write_value_roundtrip() {
        let store = MemoryStore::default();
        write_value(&store, "count", &42u32).await.unwrap();
        let value: u32 = read_or_default(&store, "count", 0).await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_write_null_removes_key() {
        let store = MemoryStore::default();
        write_value(&store, "pointer", &Some("abc".to_string()))
            .await
            .unwrap();
        write_value(&store, "pointer", &None::<String>).await.unwrap();
        assert!(store.get("pointer").await.unwrap().is_none());
    }
}
