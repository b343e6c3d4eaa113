//! ElevenLabs text-to-speech backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::voice::VoiceSettings;
use crate::TtsError;

/// Configuration for the ElevenLabs backend.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub endpoint: String,
    pub model_id: String,
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
            voice_id: std::env::var("VOICE_ID").unwrap_or_default(),
            endpoint: "https://api.elevenlabs.io/v1".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Raw synthesis backend. The caching layer sits on top, so
/// implementations only turn text into audio bytes.
#[async_trait]
pub trait TtsBackend: Send + Sync + 'static {
    async fn synthesize(&self, text: &str, settings: &VoiceSettings)
        -> Result<Vec<u8>, TtsError>;
}

/// HTTP client for the ElevenLabs text-to-speech endpoint.
pub struct ElevenLabsBackend {
    config: ElevenLabsConfig,
    client: reqwest::Client,
}

impl ElevenLabsBackend {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, TtsError> {
        if config.api_key.is_empty() {
            return Err(TtsError::Configuration(
                "ElevenLabs API key not configured".to_string(),
            ));
        }
        if config.voice_id.is_empty() {
            return Err(TtsError::Configuration(
                "voice id not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TtsError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Point the backend at a different base URL (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/text-to-speech/{}",
            self.config.endpoint, self.config.voice_id
        )
    }
}

#[async_trait]
impl TtsBackend for ElevenLabsBackend {
    async fn synthesize(
        &self,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, TtsError> {
        let request = SynthesizeRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: *settings,
        };

        let response = self
            .client
            .post(self.request_url())
            .header("xi-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TtsError::Api("empty audio response".to_string()));
        }

        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::BASE_VOICE;

    fn test_config() -> ElevenLabsConfig {
        ElevenLabsConfig {
            api_key: "el-test".to_string(),
            voice_id: "voice-1".to_string(),
            ..ElevenLabsConfig::default()
        }
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let config = ElevenLabsConfig {
            api_key: String::new(),
            voice_id: "voice-1".to_string(),
            ..ElevenLabsConfig::default()
        };
        assert!(ElevenLabsBackend::new(config).is_err());

        let config = ElevenLabsConfig {
            api_key: "el-test".to_string(),
            voice_id: String::new(),
            ..ElevenLabsConfig::default()
        };
        assert!(ElevenLabsBackend::new(config).is_err());
    }

    #[test]
    fn test_request_url_includes_voice() {
        let backend = ElevenLabsBackend::new(test_config())
            .unwrap()
            .with_endpoint("http://localhost:7777/v1");
        assert_eq!(
            backend.request_url(),
            "http://localhost:7777/v1/text-to-speech/voice-1"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = SynthesizeRequest {
            text: "kya haal hai",
            model_id: "eleven_multilingual_v2",
            voice_settings: BASE_VOICE,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"text\":\"kya haal hai\""));
        assert!(json.contains("\"model_id\":\"eleven_multilingual_v2\""));
        assert!(json.contains("\"voice_settings\""));
        assert!(json.contains("\"stability\":0.7"));
    }
}
