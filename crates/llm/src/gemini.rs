//! Gemini generateContent backend.

use std::time::Duration;

use niyati_core::{ChatModel, Error};
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(20),
            max_output_tokens: 300,
            temperature: 0.9,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

/// Chat backend speaking the Gemini REST API.
pub struct GeminiChat {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiChat {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "Gemini API key not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Point the backend at a different base URL (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: safety_settings(),
        }
    }

    /// One generateContent round trip.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(prompt);

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "no candidates in response".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, prompt: &str) -> niyati_core::Result<String> {
        self.generate_text(prompt).await.map_err(Error::from)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Persona-first safety thresholds: harassment stays permissive so the
/// character can tease and banter, everything else blocks at medium.
fn safety_settings() -> Vec<SafetySetting> {
    vec![
        SafetySetting {
            category: "HARM_CATEGORY_HARASSMENT".to_string(),
            threshold: "BLOCK_ONLY_HIGH".to_string(),
        },
        SafetySetting {
            category: "HARM_CATEGORY_HATE_SPEECH".to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        },
        SafetySetting {
            category: "HARM_CATEGORY_SEXUALLY_EXPLICIT".to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        },
        SafetySetting {
            category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        },
    ]
}

// Gemini API wire types.

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let config = GeminiConfig {
            api_key: String::new(),
            ..GeminiConfig::default()
        };
        assert!(matches!(
            GeminiChat::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_sampling_parameters() {
        let config = GeminiConfig::default();
        assert_eq!(config.temperature, 0.9);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 300);
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_request_serialization() {
        let backend = GeminiChat::new(test_config()).unwrap();
        let request = backend.build_request("hello there");
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains("\"hello there\""));
        assert!(json.contains("\"topP\":0.95"));
        assert!(json.contains("\"topK\":40"));
        assert!(json.contains("\"maxOutputTokens\":300"));
        assert!(json.contains("HARM_CATEGORY_HARASSMENT"));
        assert!(json.contains("BLOCK_ONLY_HIGH"));
        assert!(json.contains("BLOCK_MEDIUM_AND_ABOVE"));
    }

    #[test]
    fn test_request_url_shape() {
        let backend = GeminiChat::new(test_config())
            .unwrap()
            .with_endpoint("http://localhost:9999/v1beta");
        let url = backend.request_url();
        assert!(url.starts_with("http://localhost:9999/v1beta/models/"));
        assert!(url.contains(":generateContent?key=test-key"));
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            {"text": "arre "},
                            {"text": "kya baat hai!"}
                        ],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }
            ]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "arre kya baat hai!");
    }

    #[test]
    fn test_empty_candidates_parse() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
