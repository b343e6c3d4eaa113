//! Conversational memory for the agent.
//!
//! Three horizons: the in-session [`ContextBuffer`] (last 20 entries),
//! the 24 hour [`WorkingMemory`], and the long-term [`MemoryStore`]
//! implementations ([`SupabaseStore`] in production, [`InMemoryStore`]
//! as the dev fallback and in tests).

pub mod buffer;
pub mod importance;
pub mod inmem;
pub mod patterns;
pub mod supabase;
pub mod working;

pub use buffer::ContextBuffer;
pub use inmem::InMemoryStore;
pub use patterns::compute_patterns;
pub use supabase::SupabaseStore;
pub use working::{MemoryEvent, WorkingMemory};

use thiserror::Error;

/// Errors from the long-term store.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for MemoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MemoryError::Timeout
        } else {
            MemoryError::Network(e.to_string())
        }
    }
}

impl From<MemoryError> for niyati_core::Error {
    fn from(e: MemoryError) -> Self {
        niyati_core::Error::Store(e.to_string())
    }
}
