//! Welcome banner for the chat loop.

use console::style;

/// Print the banner shown when a chat starts.
pub fn print_welcome_banner(text_model: &str, image_model: &str, session_id: Option<&str>) {
    println!();
    println!("  {}", style("Glimmer").cyan().bold());
    println!(
        "  {}",
        style(format!("text: {text_model} | image: {image_model}")).dim()
    );
    match session_id {
        Some(id) => println!("  {}", style(format!("resuming session {id}")).dim()),
        None => println!("  {}", style("new conversation").dim()),
    }
    println!("  {}", style("Type /help for commands.").dim());
    println!();
}
