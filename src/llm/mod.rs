//! LLM integration for food entity extraction.
//!
//! Talks to any OpenAI-compatible chat-completions API.

mod client;

pub use client::{
    CompletionBackend, CompletionRequest, LlmClient, LlmConfig, LlmError, DEFAULT_EXTRACTION_PROMPT,
};
