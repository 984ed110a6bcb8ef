//! Application configuration types for Glimmer.
//!
//! Deserialized from `config.toml` in the data directory. Every field has a
//! default so a missing or partial file still yields a working config. The
//! API key is never part of this file; it lives in the key-value store and
//! is wrapped in `SecretString` by the infra layer.

use serde::{Deserialize, Serialize};

/// Generation parameters sent with every request to the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 4096,
        }
    }
}

/// Remote API endpoint and model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the generative API.
    pub api_base: String,
    /// Model used for plain text turns.
    pub text_model: String,
    /// Model used for image generation and editing (must support image
    /// response modalities).
    pub image_model: String,
    pub generation: GenerationParams,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-1.5-pro".to_string(),
            image_model: "gemini-2.0-flash-exp".to_string(),
            generation: GenerationParams::default(),
        }
    }
}

/// Trigger-phrase table for the request classifier.
///
/// The phrase lists are configuration, not business logic: the matching is
/// deliberately broad case-insensitive substring search, and deployments
/// may override the lists wholesale from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Phrases that mark a turn as an image-generation request.
    pub generation_triggers: Vec<String>,
    /// Phrases that mark a turn as an image-edit request, when recent
    /// history contains an image to edit.
    pub edit_triggers: Vec<String>,
    /// How many recent turns to scan for an editable image.
    pub history_window: usize,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        let generation_triggers = [
            "generate an image",
            "generate a picture",
            "generate image",
            "create an image",
            "create a picture",
            "create image",
            "make an image",
            "make a picture",
            "make me an image",
            "draw an image",
            "draw a picture",
            "draw me",
            "visualize",
        ];
        let edit_triggers = [
            "edit the image",
            "edit this image",
            "edit image",
            "edit it",
            "modify the image",
            "modify this image",
            "modify it",
            "change the image",
            "change this image",
            "change it",
            "transform the image",
            "transform this image",
            "transform it",
            "adjust the image",
            "adjust this image",
            "adjust it",
        ];
        Self {
            generation_triggers: generation_triggers.iter().map(|s| s.to_string()).collect(),
            edit_triggers: edit_triggers.iter().map(|s| s.to_string()).collect(),
            history_window: 5,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub classifier: ClassifierRules,
    pub chat: ChatConfig,
}

/// Chat-surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// System turn seeded into every fresh conversation.
    pub welcome_message: String,
    /// System turn shown after the conversation is cleared.
    pub cleared_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Welcome to Glimmer! How can I help you today?".to_string(),
            cleared_message: "Chat cleared. How can I help you today?".to_string(),
        }
    }
}
