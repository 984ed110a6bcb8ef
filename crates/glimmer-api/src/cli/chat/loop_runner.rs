//! Main chat loop orchestration.
//!
//! Wires the conversation controller to the Gemini gateway and the file
//! store, then drives the input loop: slash commands, image attachments,
//! the thinking spinner while a dispatch is in flight, and printing each
//! resolved reply.

use std::path::Path;
use std::time::Duration;

use console::style;
use secrecy::SecretString;

use glimmer_core::controller::{
    ControllerConfig, ConversationController, RejectReason, SubmitOutcome,
};
use glimmer_infra::gateway::GeminiClient;
use glimmer_types::turn::{ImageRef, Turn, TurnRole};

use crate::state::AppState;

use super::attach;
use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// Run the interactive chat loop.
pub async fn run_chat(state: &AppState, resume_session_id: Option<&str>) -> anyhow::Result<()> {
    let api_key = state.api_key().await;
    let credential_configured = api_key.is_some();

    let gateway = GeminiClient::new(
        api_key.unwrap_or_else(|| SecretString::from(String::new())),
        state.config.gateway.clone(),
    );
    let config = ControllerConfig {
        rules: state.config.classifier.clone(),
        chat: state.config.chat.clone(),
        credential_configured,
    };
    let mut controller = ConversationController::new(gateway, state.session_store(), config);
    controller.initialize();

    if let Some(id) = resume_session_id {
        if !controller.load_session(id).await {
            anyhow::bail!("Session '{id}' not found");
        }
    }

    print_welcome_banner(
        &state.config.gateway.text_model,
        &state.config.gateway.image_model,
        controller.session_id(),
    );

    if !credential_configured {
        println!(
            "  {} No API key configured. Set one with: {}",
            style("!").yellow().bold(),
            style("glim key set").yellow()
        );
        println!();
    }

    for turn in controller.turns() {
        print_turn(turn, None);
    }
    println!();

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    // An attached image rides along with the next submitted message.
    let mut attachment: Option<ImageRef> = None;

    loop {
        let event = chat_input.read_line().await;
        match event {
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() && attachment.is_none() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            commands::print_help();
                            continue;
                        }
                        ChatCommand::Clear => {
                            controller.clear().await;
                            attachment = None;
                            chat_input.clear_screen();
                            for turn in controller.turns() {
                                print_turn(turn, None);
                            }
                            println!();
                            continue;
                        }
                        ChatCommand::History => {
                            println!();
                            for turn in controller.turns() {
                                print_turn(turn, None);
                            }
                            println!();
                            continue;
                        }
                        ChatCommand::Sessions => {
                            let sessions = controller.sessions().list().await;
                            println!();
                            if sessions.is_empty() {
                                println!("  {}", style("No saved sessions yet.").dim());
                            }
                            for session in &sessions {
                                println!(
                                    "  {} {} {}",
                                    style(&session.id).dim(),
                                    style(&session.title).cyan(),
                                    style(session.timestamp.format("%Y-%m-%d %H:%M")).dim()
                                );
                            }
                            println!();
                            continue;
                        }
                        ChatCommand::Image(spec) => {
                            match attach::load_attachment(&spec).await {
                                Ok(image) => {
                                    attachment = Some(image);
                                    println!(
                                        "  {} Image attached; it will ride along with your next message.",
                                        style("*").cyan().bold()
                                    );
                                }
                                Err(err) => {
                                    println!(
                                        "  {} Could not attach image: {err}",
                                        style("!").red().bold()
                                    );
                                }
                            }
                            continue;
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Chat ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                            continue;
                        }
                    }
                }

                let spinner = indicatif::ProgressBar::new_spinner();
                spinner.set_style(
                    indicatif::ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .unwrap(),
                );
                spinner.set_message("thinking...");
                spinner.enable_steady_tick(Duration::from_millis(80));

                let outcome = controller.submit(&text, attachment.take()).await;
                spinner.finish_and_clear();

                match outcome {
                    SubmitOutcome::Rejected(RejectReason::Blank) => continue,
                    SubmitOutcome::Rejected(RejectReason::MissingCredential) => {
                        println!(
                            "  {} Set your API key first: {}",
                            style("!").yellow().bold(),
                            style("glim key set").yellow()
                        );
                        continue;
                    }
                    SubmitOutcome::Rejected(RejectReason::Busy) => {
                        println!(
                            "  {} Still working on the previous message.",
                            style("!").yellow().bold()
                        );
                        continue;
                    }
                    SubmitOutcome::Completed | SubmitOutcome::Acknowledged => {
                        if let Some(turn) = controller.turns().last() {
                            let saved = match &turn.image {
                                Some(image) => {
                                    attach::save_inline_image(&state.data_dir, image).await
                                }
                                None => None,
                            };
                            println!();
                            print_turn(turn, saved.as_deref());
                            println!();
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Print one turn with role styling. `image_path` points at a freshly
/// saved copy of the turn's inline image, when there is one.
fn print_turn(turn: &Turn, image_path: Option<&Path>) {
    match turn.role {
        TurnRole::System => println!("  {}", style(&turn.content).dim()),
        TurnRole::User => println!(
            "  {} {}",
            style("You >").green().bold(),
            turn.content
        ),
        TurnRole::Assistant => println!(
            "  {} {}",
            style("Glimmer >").cyan().bold(),
            turn.content
        ),
    }

    if let Some(path) = image_path {
        println!(
            "  {}",
            style(format!("image saved to {}", path.display())).dim()
        );
    } else if let Some(image) = &turn.image {
        let note = match image {
            ImageRef::Inline { mime_type, .. } => format!("[inline image: {mime_type}]"),
            ImageRef::Url(url) => format!("[image: {url}]"),
        };
        println!("  {}", style(note).dim());
    }
}
