//! API credential CLI commands: set, show, clear.
//!
//! The key is stored as its own document in the file store and is never
//! echoed back; `show` only reports whether one is configured.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use glimmer_core::storage::kv_store::{KvStore, write_value};

use crate::state::{AppState, CREDENTIAL_KEY};

/// Prompt for the API key (hidden input) and store it.
pub async fn set_key(state: &AppState, json: bool) -> Result<()> {
    let key = Password::new()
        .with_prompt("API key")
        .allow_empty_password(true)
        .interact()?;

    let key = key.trim().to_string();
    if key.is_empty() {
        if json {
            println!("{}", serde_json::json!({"stored": false}));
        } else {
            println!(
                "  {} Empty input, nothing stored.",
                style("!").yellow().bold()
            );
        }
        return Ok(());
    }

    write_value(&state.store(), CREDENTIAL_KEY, &key).await?;

    if json {
        println!("{}", serde_json::json!({"stored": true}));
    } else {
        println!("  {} API key stored.", style("*").green().bold());
    }
    Ok(())
}

/// Report whether a key is configured.
pub async fn show_key(state: &AppState, json: bool) -> Result<()> {
    let configured = state.api_key().await.is_some();

    if json {
        println!("{}", serde_json::json!({"configured": configured}));
    } else if configured {
        println!("  {} An API key is configured.", style("*").green().bold());
    } else {
        println!(
            "  {} No API key configured. Set one with: {}",
            style("i").blue().bold(),
            style("glim key set").yellow()
        );
    }
    Ok(())
}

/// Remove the stored key.
pub async fn clear_key(state: &AppState, json: bool) -> Result<()> {
    state.store().remove(CREDENTIAL_KEY).await?;

    if json {
        println!("{}", serde_json::json!({"cleared": true}));
    } else {
        println!("  {} API key removed.", style("x").red().bold());
    }
    Ok(())
}
