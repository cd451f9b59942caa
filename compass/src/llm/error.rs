//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// True if the failure happened before any response content arrived
    ///
    /// Callers that want retries must implement them themselves; this core
    /// propagates all failures unmodified.
    pub fn is_pre_response(&self) -> bool {
        matches!(self, LlmError::MissingCredential(_) | LlmError::ApiError { .. })
    }
}
