//! Interactive CLI chat experience for Glimmer.
//!
//! This module implements the chat loop: submitting turns through the
//! conversation controller, a thinking spinner while a dispatch is in
//! flight, slash commands, image attachments, and session persistence.
//! Entry point: `loop_runner::run_chat`.

pub mod attach;
pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
