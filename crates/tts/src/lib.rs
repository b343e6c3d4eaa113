//! Speech synthesis: mood-tuned ElevenLabs delivery behind a blob cache.

pub mod cache;
pub mod elevenlabs;
pub mod voice;

pub use cache::{cache_key, VoiceSynth};
pub use elevenlabs::{ElevenLabsBackend, ElevenLabsConfig, TtsBackend};
pub use voice::{settings_for, VoiceSettings, BASE_VOICE};

use thiserror::Error;

/// Errors from the speech backend and blob store.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Audio storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Network(e.to_string())
        }
    }
}

impl From<TtsError> for niyati_core::Error {
    fn from(e: TtsError) -> Self {
        match e {
            TtsError::Timeout => niyati_core::Error::Timeout("speech synthesis".to_string()),
            other => niyati_core::Error::Tts(other.to_string()),
        }
    }
}
