//! Deck generation through the Gemini `generateContent` API.

pub mod client;
pub mod config;

pub use client::GeminiClient;
pub use config::GenerationConfig;
