//! Ollama client, prompt templates, and tolerant response parsing

pub mod client;
pub mod extract;
pub mod prompts;

pub use client::{LlmError, OllamaClient};
