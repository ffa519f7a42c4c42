// crates/core/src/llm/types.rs
//! Request/response/error types for the generation provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single structured-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language prompt describing what to generate.
    pub prompt: String,
    /// JSON schema the provider must conform to.
    pub schema: serde_json::Value,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    8192
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Raw structured output from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated JSON document.
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Errors from a single generation attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("authentication failed ({status})")]
    Auth { status: u16 },

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to parse provider response: {0}")]
    ParseFailed(String),
}

impl GenerationError {
    /// Whether retrying the same credential could plausibly succeed.
    ///
    /// Rate limits, server-side errors, timeouts and transport failures
    /// are transient; auth failures and rejected requests are not.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited
                | GenerationError::Server { .. }
                | GenerationError::Timeout(_)
                | GenerationError::Transport(_)
        )
    }
}
