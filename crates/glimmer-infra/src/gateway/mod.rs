//! Remote generative API gateway implementations.

pub mod gemini;

pub use gemini::GeminiClient;
