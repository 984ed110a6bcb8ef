//! Session store: the persisted collection of saved conversations.
//!
//! Generic over the [`KvStore`] port. The whole collection is rewritten on
//! every mutation -- acceptable because it is bounded by normal local usage
//! and persistence is not on a latency-critical path.

use tracing::info;
use uuid::Uuid;

use glimmer_types::error::StoreError;
use glimmer_types::session::Session;
use glimmer_types::turn::{Turn, TurnRole};

use crate::storage::kv_store::{KvStore, read_or_default, write_value};

/// Store key for the session collection.
const SESSIONS_KEY: &str = "sessions";
/// Store key for the current-session pointer.
const CURRENT_SESSION_KEY: &str = "current-session";

/// Display truncation lengths for derived metadata.
const TITLE_LEN: usize = 30;
const PREVIEW_LEN: usize = 40;

/// Persisted collection of sessions plus the current-session pointer.
///
/// The stored order IS the listing order: saves insert or move the session
/// to the front, so the collection stays most-recently-modified first.
pub struct SessionStore<K> {
    kv: K,
}

impl<K: KvStore> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// All sessions, most recently modified first.
    pub async fn list(&self) -> Vec<Session> {
        read_or_default(&self.kv, SESSIONS_KEY, Vec::new()).await
    }

    /// Look up a session by id.
    pub async fn get_by_id(&self, id: &str) -> Option<Session> {
        self.list().await.into_iter().find(|s| s.id == id)
    }

    /// Case-insensitive substring search over title and preview.
    ///
    /// A blank query returns the full list unfiltered.
    pub async fn search(&self, query: &str) -> Vec<Session> {
        let sessions = self.list().await;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return sessions;
        }
        sessions
            .into_iter()
            .filter(|s| {
                s.title.to_lowercase().contains(&needle)
                    || s.preview.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Save a turn list as a session.
    ///
    /// With `existing_id` the session is replaced in place (same id) and
    /// moved to the front; otherwise a new id is minted. Pending turns are
    /// never committed. Returns the saved id, or None when there was
    /// nothing to save.
    pub async fn save(
        &self,
        turns: &[Turn],
        existing_id: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let turns: Vec<Turn> = turns.iter().filter(|t| !t.is_pending()).cloned().collect();
        if turns.is_empty() {
            return Ok(None);
        }

        let title = turns
            .iter()
            .find(|t| t.role == TurnRole::User)
            .map(|t| truncate(&t.content, TITLE_LEN))
            .unwrap_or_else(|| "New Chat".to_string());
        // turns is non-empty here
        let preview = truncate(&turns[turns.len() - 1].content, PREVIEW_LEN);

        let id = existing_id
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let session = Session {
            id: id.clone(),
            title,
            preview,
            timestamp: chrono::Utc::now(),
            turns,
        };

        let mut sessions = self.list().await;
        sessions.retain(|s| s.id != id);
        sessions.insert(0, session);
        write_value(&self.kv, SESSIONS_KEY, &sessions).await?;
        self.set_current(Some(id.as_str())).await?;

        info!(session_id = %id, "session saved");
        Ok(Some(id))
    }

    /// Delete a session. Idempotent; clears the current-session pointer
    /// when it referenced the deleted id.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut sessions = self.list().await;
        sessions.retain(|s| s.id != id);
        write_value(&self.kv, SESSIONS_KEY, &sessions).await?;

        if self.current_id().await.as_deref() == Some(id) {
            self.set_current(None).await?;
        }

        info!(session_id = %id, "session deleted");
        Ok(())
    }

    /// The current-session pointer; None means an unsaved draft is active.
    pub async fn current_id(&self) -> Option<String> {
        read_or_default(&self.kv, CURRENT_SESSION_KEY, None).await
    }

    /// Update the current-session pointer. None detaches into draft state.
    pub async fn set_current(&self, id: Option<&str>) -> Result<(), StoreError> {
        write_value(&self.kv, CURRENT_SESSION_KEY, &id).await
    }
}

/// Character-based truncation with a `...` marker, safe on multi-byte text.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_types::turn::Pending;
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

    fn store() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::default())
    }

    fn exchange(user: &str, assistant: &str) -> Vec<Turn> {
        vec![
            Turn::system("Welcome!"),
            Turn::user(user),
            Turn::assistant(assistant),
        ]
    }

    #[tokio::test]
    async fn test_save_and_get_roundtrip() {
        let store = store();
        let turns = exchange("Hello there", "General Kenobi");

        let id = store.save(&turns, None).await.unwrap().unwrap();
        let session = store.get_by_id(&id).await.unwrap();

        assert_eq!(session.turns, turns);
        assert_eq!(session.title, "Hello there");
        assert_eq!(session.preview, "General Kenobi");
    }

    #[tokio::test]
    async fn test_save_empty_is_noop() {
        let store = store();
        assert!(store.save(&[], None).await.unwrap().is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_title_and_preview_truncation() {
        let store = store();
        let long_user = "a".repeat(45);
        let long_reply = "b".repeat(60);
        let id = store
            .save(&exchange(&long_user, &long_reply), None)
            .await
            .unwrap()
            .unwrap();
        let session = store.get_by_id(&id).await.unwrap();
        assert_eq!(session.title, format!("{}...", "a".repeat(30)));
        assert_eq!(session.preview, format!("{}...", "b".repeat(40)));
    }

    #[tokio::test]
    async fn test_title_defaults_without_user_turn() {
        let store = store();
        let turns = vec![Turn::system("Welcome!")];
        let id = store.save(&turns, None).await.unwrap().unwrap();
        assert_eq!(store.get_by_id(&id).await.unwrap().title, "New Chat");
    }

    #[tokio::test]
    async fn test_pending_turns_are_not_committed() {
        let store = store();
        let mut turns = exchange("hi", "hello");
        turns.push(Turn::placeholder(Pending::Response, "Thinking..."));
        let id = store.save(&turns, None).await.unwrap().unwrap();
        let session = store.get_by_id(&id).await.unwrap();
        assert!(session.turns.iter().all(|t| !t.is_pending()));
        assert_eq!(session.turns.len(), 3);
    }

    #[tokio::test]
    async fn test_resave_keeps_count_and_moves_to_front() {
        let store = store();
        let first = store
            .save(&exchange("first chat", "ok"), None)
            .await
            .unwrap()
            .unwrap();
        let second = store
            .save(&exchange("second chat", "ok"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.list().await.len(), 2);

        let updated = store
            .save(&exchange("first chat", "updated reply"), Some(&first))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated, first);

        let sessions = store.list().await;
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first);
        assert_eq!(sessions[0].preview, "updated reply");
        assert_eq!(sessions[1].id, second);
    }

    #[tokio::test]
    async fn test_save_updates_current_pointer() {
        let store = store();
        let id = store
            .save(&exchange("hi", "hello"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.current_id().await, Some(id));
    }

    #[tokio::test]
    async fn test_delete_clears_pointer_when_current() {
        let store = store();
        let id = store
            .save(&exchange("hi", "hello"), None)
            .await
            .unwrap()
            .unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.get_by_id(&id).await.is_none());
        assert!(store.current_id().await.is_none());

        // Idempotent
        store.delete(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_keeps_pointer_for_other_session() {
        let store = store();
        let first = store
            .save(&exchange("first", "ok"), None)
            .await
            .unwrap()
            .unwrap();
        let second = store
            .save(&exchange("second", "ok"), None)
            .await
            .unwrap()
            .unwrap();

        store.delete(&first).await.unwrap();
        assert_eq!(store.current_id().await, Some(second));
    }

    #[tokio::test]
    async fn test_search_matches_title_or_preview() {
        let store = store();
        store
            .save(&exchange("rust borrow checker", "lifetimes explained"), None)
            .await
            .unwrap();
        store
            .save(&exchange("dinner ideas", "try pasta carbonara"), None)
            .await
            .unwrap();

        let by_title = store.search("BORROW").await;
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "rust borrow checker");

        let by_preview = store.search("carbonara").await;
        assert_eq!(by_preview.len(), 1);

        let none = store.search("quantum").await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_returns_all() {
        let store = store();
        store.save(&exchange("one", "a"), None).await.unwrap();
        store.save(&exchange("two", "b"), None).await.unwrap();
        assert_eq!(store.search("").await.len(), 2);
        assert_eq!(store.search("   ").await.len(), 2);
    }

    #[tokio::test]
    async fn test_list_survives_corrupt_collection() {
        let store = store();
        store
            .kv
            .set(SESSIONS_KEY, &serde_json::json!({"not": "a list"}))
            .await
            .unwrap();
        assert!(store.list().await.is_empty());
    }
}
