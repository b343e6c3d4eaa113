//! Configuration loading and validation for the Niyati server.

pub mod settings;

pub use settings::{
    load_settings, ElevenLabsSettings, GeminiSettings, ObservabilityConfig, ServerConfig,
    SessionConfig, Settings, StorageConfig, SupabaseSettings, TelegramSettings,
};

use thiserror::Error;

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Missing required setting: {0}")]
    Missing(String),
}
