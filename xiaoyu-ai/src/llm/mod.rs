//! Hosted language model access
//!
//! The orchestrator talks to a [`LanguageModel`]; production uses
//! [`OpenAiClient`] (any OpenAI-compatible chat-completions endpoint) and
//! tests substitute a scripted implementation.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a language model call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Missing or rejected API key
    #[error("Invalid API key: {0}")]
    Unauthorized(String),

    /// Upstream rate limit hit
    #[error("Upstream rate limit exceeded: {0}")]
    RateLimited(String),

    /// Request did not complete in time
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response arrived but could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other upstream or transport failure
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl LlmError {
    /// Classify a free-form upstream error message
    ///
    /// Providers report many failures only as text, so the message is
    /// searched for "API key", "rate limit" and "timeout" (in that order).
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("API key") {
            LlmError::Unauthorized(message)
        } else if message.contains("rate limit") {
            LlmError::RateLimited(message)
        } else if message.contains("timeout") {
            LlmError::Timeout(message)
        } else {
            LlmError::Upstream(message)
        }
    }

    /// Map an HTTP error status (and body) from the provider
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => LlmError::Unauthorized(body),
            429 => LlmError::RateLimited(body),
            408 | 504 => LlmError::Timeout(body),
            _ => LlmError::classify(format!("HTTP {}: {}", status, body)),
        }
    }
}

/// A chat model that turns a system prompt plus a user prompt into text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate one completion
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier for logs
    fn model_name(&self) -> &str;
}
