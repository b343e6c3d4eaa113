//! Settings loaded from the environment.
//!
//! Every service credential comes from a plain environment variable
//! (GEMINI_API_KEY, ELEVENLABS_API_KEY, VOICE_ID, SUPABASE_URL,
//! SUPABASE_KEY, TELEGRAM_BOT_TOKEN, WEBHOOK_URL). Structured overrides
//! use the NIYATI prefix with `__` as the section separator, e.g.
//! NIYATI__SERVER__PORT=9000.

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub elevenlabs: ElevenLabsSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_api_key")]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevenLabsSettings {
    #[serde(default = "default_elevenlabs_api_key")]
    pub api_key: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_elevenlabs_model")]
    pub model_id: String,
    #[serde(default = "default_elevenlabs_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default = "default_supabase_url")]
    pub url: String,
    #[serde(default = "default_supabase_key")]
    pub key: String,
}

impl SupabaseSettings {
    /// Both the project URL and the service key are present.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(default = "default_telegram_bot_token")]
    pub bot_token: String,
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
}

impl TelegramSettings {
    /// Public origin derived from the webhook URL, used to build
    /// absolute audio links for the bot API.
    pub fn public_base_url(&self) -> Option<String> {
        if self.webhook_url.is_empty() {
            return None;
        }
        Some(
            self.webhook_url
                .trim_end_matches('/')
                .trim_end_matches("/webhook")
                .to_string(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle seconds before a session is reaped.
    #[serde(default = "default_session_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where synthesized audio blobs are written.
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

impl Settings {
    /// Validate settings after loading. Missing service credentials are
    /// startup-fatal; the Supabase pair is optional as a unit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_gemini()?;
        self.validate_elevenlabs()?;
        self.validate_supabase()?;
        self.validate_telegram()?;
        self.validate_session()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                message: "host cannot be empty".to_string(),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "port cannot be 0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_gemini(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key.is_empty() {
            return Err(ConfigError::Missing("GEMINI_API_KEY".to_string()));
        }
        if self.gemini.model.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gemini.model".to_string(),
                message: "model cannot be empty".to_string(),
            });
        }
        if self.gemini.timeout_seconds == 0 || self.gemini.timeout_seconds > 120 {
            return Err(ConfigError::InvalidValue {
                field: "gemini.timeout_seconds".to_string(),
                message: "timeout must be between 1 and 120 seconds".to_string(),
            });
        }
        Ok(())
    }

    fn validate_elevenlabs(&self) -> Result<(), ConfigError> {
        if self.elevenlabs.api_key.is_empty() {
            return Err(ConfigError::Missing("ELEVENLABS_API_KEY".to_string()));
        }
        if self.elevenlabs.voice_id.is_empty() {
            return Err(ConfigError::Missing("VOICE_ID".to_string()));
        }
        Ok(())
    }

    fn validate_supabase(&self) -> Result<(), ConfigError> {
        // Allow both empty (in-memory fallback) but reject a half pair.
        if self.supabase.url.is_empty() != self.supabase.key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "supabase".to_string(),
                message: "SUPABASE_URL and SUPABASE_KEY must be set together".to_string(),
            });
        }
        Ok(())
    }

    fn validate_telegram(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN".to_string()));
        }
        if !self.telegram.webhook_url.is_empty() && !self.telegram.webhook_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "telegram.webhook_url".to_string(),
                message: "webhook URL must use https".to_string(),
            });
        }
        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.timeout_seconds".to_string(),
                message: "session timeout cannot be 0".to_string(),
            });
        }
        if self.session.cleanup_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_seconds".to_string(),
                message: "cleanup interval cannot be 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gemini: GeminiSettings::default(),
            elevenlabs: ElevenLabsSettings::default(),
            supabase: SupabaseSettings::default(),
            telegram: TelegramSettings::default(),
            session: SessionConfig::default(),
            storage: StorageConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: default_gemini_api_key(),
            model: default_gemini_model(),
            timeout_seconds: default_gemini_timeout_seconds(),
        }
    }
}

impl Default for ElevenLabsSettings {
    fn default() -> Self {
        Self {
            api_key: default_elevenlabs_api_key(),
            voice_id: default_voice_id(),
            model_id: default_elevenlabs_model(),
            timeout_seconds: default_elevenlabs_timeout_seconds(),
        }
    }
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: default_supabase_url(),
            key: default_supabase_key(),
        }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: default_telegram_bot_token(),
            webhook_url: default_webhook_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_session_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from the environment and validate them.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let config = Config::builder()
        .add_source(
            Environment::with_prefix("NIYATI")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

fn default_host() -> String {
    std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000)
}

fn default_gemini_api_key() -> String {
    std::env::var("GEMINI_API_KEY").unwrap_or_default()
}

fn default_gemini_model() -> String {
    std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string())
}

fn default_gemini_timeout_seconds() -> u64 {
    20
}

fn default_elevenlabs_api_key() -> String {
    std::env::var("ELEVENLABS_API_KEY").unwrap_or_default()
}

fn default_voice_id() -> String {
    std::env::var("VOICE_ID").unwrap_or_default()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_elevenlabs_timeout_seconds() -> u64 {
    15
}

fn default_supabase_url() -> String {
    std::env::var("SUPABASE_URL").unwrap_or_default()
}

fn default_supabase_key() -> String {
    std::env::var("SUPABASE_KEY").unwrap_or_default()
}

fn default_telegram_bot_token() -> String {
    std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default()
}

fn default_webhook_url() -> String {
    std::env::var("WEBHOOK_URL").unwrap_or_default()
}

fn default_session_timeout() -> u64 {
    3600
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_audio_dir() -> String {
    "audio_cache".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
