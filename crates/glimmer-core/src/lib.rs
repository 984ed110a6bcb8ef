//! Dispatch and session logic for Glimmer.
//!
//! This crate defines the "ports" (the key-value store and gateway traits)
//! that the infrastructure layer implements, plus the pure request
//! classifier, the session store, and the conversation controller. It
//! depends only on `glimmer-types` -- never on `glimmer-infra` or any
//! network/filesystem crate.

pub mod classifier;
pub mod controller;
pub mod gateway;
pub mod session;
pub mod storage;
