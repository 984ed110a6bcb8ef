//! Infrastructure implementations for Glimmer.
//!
//! Concrete adapters behind the ports defined in `glimmer-core`: the
//! file-backed key-value store and the Generative Language API client,
//! plus data-directory resolution and config loading.

pub mod config;
pub mod gateway;
pub mod storage;
