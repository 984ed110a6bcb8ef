//! Glimmer CLI and CORS relay entry point.
//!
//! Binary name: `glim`
//!
//! Parses CLI arguments, initializes the data directory and configuration,
//! then dispatches to the appropriate command handler or starts the relay
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, KeyAction, SessionAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,glimmer=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "glim", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (data dir, config)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat { session } => {
            cli::chat::loop_runner::run_chat(&state, session.as_deref()).await?;
        }

        Commands::Sessions { action } => match action {
            SessionAction::List { search } => {
                cli::session::list_sessions(&state, search.as_deref(), cli.json).await?;
            }
            SessionAction::Show { id } => {
                cli::session::show_session(&state, &id, cli.json).await?;
            }
            SessionAction::Delete { id, force } => {
                cli::session::delete_session(&state, &id, force, cli.json).await?;
            }
        },

        Commands::Key { action } => match action {
            KeyAction::Set => cli::key::set_key(&state, cli.json).await?,
            KeyAction::Show => cli::key::show_key(&state, cli.json).await?,
            KeyAction::Clear => cli::key::clear_key(&state, cli.json).await?,
        },

        Commands::Relay { port } => {
            cli::relay::run_relay(&state, port).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
