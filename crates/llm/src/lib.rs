//! Chat generation: the Gemini backend plus the response hygiene layer
//! that keeps replies in character.

pub mod fallback;
pub mod filter;
pub mod gemini;

pub use fallback::fallback_utterance;
pub use filter::clean_response;
pub use gemini::{GeminiChat, GeminiConfig};

use thiserror::Error;

/// Errors from the chat backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            // without_url: the request URL carries the API key.
            LlmError::Network(e.without_url().to_string())
        }
    }
}

impl From<LlmError> for niyati_core::Error {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => niyati_core::Error::Timeout("chat generation".to_string()),
            other => niyati_core::Error::Llm(other.to_string()),
        }
    }
}
