//! Session management CLI commands: list, show, delete.
//!
//! Provides session browsing with rich tables, transcript dumps, and
//! deletion with a confirmation prompt.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use glimmer_types::turn::{Turn, TurnRole};

use crate::state::AppState;

/// List saved sessions, optionally filtered by a search query.
///
/// # Examples
///
/// ```bash
/// glim sessions list
/// glim sessions list --search rust
/// glim sessions list --json
/// ```
pub async fn list_sessions(state: &AppState, search: Option<&str>, json: bool) -> Result<()> {
    let store = state.session_store();
    let sessions = store.search(search.unwrap_or("")).await;
    let current = store.current_id().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions found. Start one with: {}",
            style("i").blue().bold(),
            style("glim chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
        Cell::new("Preview").fg(Color::White),
    ]);

    for session in &sessions {
        let title = if current.as_deref() == Some(session.id.as_str()) {
            format!("{} *", session.title)
        } else {
            session.title.clone()
        };

        table.add_row(vec![
            Cell::new(&session.id).fg(Color::DarkGrey),
            Cell::new(title).fg(Color::Cyan),
            Cell::new(session.timestamp.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(session.turns.len().to_string()).fg(Color::White),
            Cell::new(&session.preview).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a session transcript.
///
/// # Examples
///
/// ```bash
/// glim sessions show <session-id>
/// glim sessions show <session-id> --json
/// ```
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let session = state
        .session_store()
        .get_by_id(id)
        .await
        .with_context(|| format!("Session '{id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!("# {}", session.title);
    println!();
    println!(
        "- **Updated:** {}",
        session.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    println!("- **Turns:** {}", session.turns.len());
    println!();
    println!("---");
    println!();

    for turn in &session.turns {
        print_transcript_turn(turn);
    }

    Ok(())
}

fn print_transcript_turn(turn: &Turn) {
    let role_label = match turn.role {
        TurnRole::User => "**You**",
        TurnRole::Assistant => "**Assistant**",
        TurnRole::System => "**System**",
    };

    let timestamp = turn.timestamp.format("%H:%M");
    println!("### {role_label} ({timestamp})");
    println!();
    if !turn.content.is_empty() {
        println!("{}", turn.content);
    }
    if let Some(image) = &turn.image {
        let note = match image {
            glimmer_types::turn::ImageRef::Inline { mime_type, .. } => {
                format!("[inline image: {mime_type}]")
            }
            glimmer_types::turn::ImageRef::Url(url) => format!("[image: {url}]"),
        };
        println!("{note}");
    }
    println!();
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// glim sessions delete <session-id>
/// glim sessions delete <session-id> --force
/// ```
pub async fn delete_session(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let store = state.session_store();
    let session = store
        .get_by_id(id)
        .await
        .with_context(|| format!("Session '{id}' not found"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} turns)?",
                style(&session.title).red().bold(),
                session.turns.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    store.delete(id).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "session_id": id}));
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session.title
        );
    }

    Ok(())
}
