//! CLI command starting the CORS relay server.

use anyhow::Result;
use console::style;

use crate::http::relay::RelayState;
use crate::http::router::build_router;
use crate::state::AppState;

/// Run the relay until interrupted.
///
/// # Examples
///
/// ```bash
/// glim relay
/// glim relay --port 8787
/// ```
pub async fn run_relay(state: &AppState, port: u16) -> Result<()> {
    let relay_state = RelayState::new(state.config.gateway.api_base.clone());
    let router = build_router(relay_state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;

    println!();
    println!(
        "  {} Relay listening on {}",
        style("*").green().bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {}",
        style(format!("POST http://{addr}/relay with {{endpoint, apiKey, payload}}")).dim()
    );
    println!();

    axum::serve(listener, router).await?;
    Ok(())
}
