//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for the
//! conversation, saved sessions, and image attachments.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Reset the conversation to a fresh draft.
    Clear,
    /// Show the full turn list of the active conversation.
    History,
    /// List saved sessions.
    Sessions,
    /// Attach an image (path or URL) to the next message.
    Image(String),
    /// Exit the chat.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/new" | "/reset" => Some(ChatCommand::Clear),
        "/history" => Some(ChatCommand::History),
        "/sessions" => Some(ChatCommand::Sessions),
        "/image" | "/img" => match arg {
            Some(spec) if !spec.is_empty() => Some(ChatCommand::Image(spec)),
            _ => Some(ChatCommand::Unknown(
                "/image requires a path or URL".to_string(),
            )),
        },
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}      {}", style("/help").cyan(), "Show this help message");
    println!(
        "  {}     {}",
        style("/clear").cyan(),
        "Start a fresh conversation (also /new)"
    );
    println!(
        "  {}   {}",
        style("/history").cyan(),
        "Show the full conversation"
    );
    println!("  {}  {}", style("/sessions").cyan(), "List saved sessions");
    println!(
        "  {} {}",
        style("/image <p>").cyan(),
        "Attach an image (path or URL) to the next message"
    );
    println!("  {}      {}", style("/exit").cyan(), "End the chat");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
