//! Error types shared across the agent pipeline.

use thiserror::Error;

/// Top-level error for agent operations.
///
/// Backend crates define their own richer error enums and convert into
/// this type at the pipeline boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Chat model backend failed.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Speech synthesis backend failed.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Memory store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Messaging platform gateway failed.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// An operation exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The client transport closed while a turn was in flight.
    /// Callers cancel remaining work and do not persist the turn.
    #[error("Transport closed")]
    TransportClosed,

    /// Input that cannot be processed. Acknowledged without a turn.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the error is worth a single retry against the backend.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Llm(_) | Error::Tts(_) | Error::Store(_) | Error::Timeout(_))
    }
}

/// Result alias used throughout the agent crates.
pub type Result<T> = std::result::Result<T, Error>;
