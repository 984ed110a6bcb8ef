//! Generative Language API gateway.
//!
//! This module provides the [`GeminiClient`] which implements the
//! [`GatewayClient`](glimmer_core::gateway::GatewayClient) trait over the
//! `models/{model}:generateContent` JSON protocol, covering text
//! completion, image generation, and image editing.

pub mod client;
pub mod types;

pub use client::GeminiClient;
