//! foodlabel - food description standardization and LLM entity extraction.
//!
//! Core library: preprocessing, batching, rate-limited annotation, flattening,
//! and chunked CSV output.

pub mod config;
pub mod llm;
pub mod pipeline;
pub mod preprocess;
pub mod rate_limit;
