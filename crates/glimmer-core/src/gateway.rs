//! GatewayClient trait definition.
//!
//! The port for the remote generative API. One method per classified
//! operation; each returns the normalized result turn. Implementations
//! live in glimmer-infra (e.g., `GeminiClient`).

use glimmer_types::error::GatewayError;
use glimmer_types::turn::{ImageRef, Turn};

/// Trait for the remote text/image generation API.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Callers must
/// never pass pending placeholder turns to `send_text`; the conversation
/// controller filters them before dispatch.
pub trait GatewayClient: Send + Sync {
    /// Send the conversation history for a plain text completion.
    fn send_text(
        &self,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<Turn, GatewayError>> + Send;

    /// Generate an image from a prompt. A reply without an image part is a
    /// soft failure: the returned turn explains the shortfall in text.
    fn generate_image(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<Turn, GatewayError>> + Send;

    /// Edit the source image according to the instructions, normalizing the
    /// reply exactly as `generate_image` does.
    fn edit_image(
        &self,
        instructions: &str,
        source: &ImageRef,
    ) -> impl std::future::Future<Output = Result<Turn, GatewayError>> + Send;
}
