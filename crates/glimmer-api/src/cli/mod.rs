//! CLI command definitions and dispatch for the `glim` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a
//! verb-noun pattern (e.g., `glim sessions list`, `glim key set`).

pub mod chat;
pub mod key;
pub mod relay;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with a hosted generative text/image API from the terminal.
#[derive(Parser)]
#[command(name = "glim", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat {
        /// Resume a saved session by id.
        #[arg(long)]
        session: Option<String>,
    },

    /// Browse and manage saved sessions.
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Manage the API credential.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Run the same-origin CORS relay server.
    Relay {
        /// Port to listen on.
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },

    /// Generate shell completion scripts.
    Completions { shell: Shell },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List saved sessions, most recently updated first.
    #[command(alias = "ls")]
    List {
        /// Filter by a title/preview substring (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// Print a session transcript.
    Show { id: String },

    /// Delete a session.
    Delete {
        id: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store the API key (prompted with hidden input).
    Set,
    /// Show whether a key is configured. The value is never printed.
    Show,
    /// Remove the stored API key.
    Clear,
}
