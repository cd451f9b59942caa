//! LLM client module
//!
//! Provides the backend-agnostic client trait, the wire types, and the
//! Anthropic Messages API implementation. There is deliberately no retry
//! or backoff anywhere in this module: upstream failures surface to the
//! caller unmodified.

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, StreamEvent, TokenUsage};
