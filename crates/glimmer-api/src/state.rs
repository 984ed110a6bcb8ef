//! Application state shared by the CLI commands and the relay server.
//!
//! Holds the resolved data directory and the loaded configuration. The
//! file store is cheap to construct, so each consumer gets its own handle
//! pinned to the same directory.

use std::path::PathBuf;

use secrecy::SecretString;

use glimmer_core::session::store::SessionStore;
use glimmer_core::storage::kv_store::read_or_default;
use glimmer_infra::config::{load_app_config, resolve_data_dir};
use glimmer_infra::storage::JsonFileStore;
use glimmer_types::config::AppConfig;

/// Store key for the API credential.
pub const CREDENTIAL_KEY: &str = "api-key";

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: ensure the data directory exists
    /// and load `config.toml`.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let config = load_app_config(&data_dir).await;
        Ok(Self { config, data_dir })
    }

    /// A key-value store handle rooted at the data directory.
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_dir)
    }

    /// A session store over a fresh store handle.
    pub fn session_store(&self) -> SessionStore<JsonFileStore> {
        SessionStore::new(self.store())
    }

    /// The configured API credential, wrapped the moment it is read.
    pub async fn api_key(&self) -> Option<SecretString> {
        let key: Option<String> = read_or_default(&self.store(), CREDENTIAL_KEY, None).await;
        key.filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }
}
