//! Telegram Bot API gateway
//!
//! Thin JSON client for the three methods the agent uses (sendMessage,
//! sendVoice, sendChatAction) plus setWebhook at startup, and the
//! webhook sink that relays reply envelopes into a chat. The bot token
//! is part of every request path, so errors are logged by method name
//! and never with the URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use niyati_agent::Outbound;
use niyati_core::{Envelope, Error, Result};

use crate::ServerError;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Telegram Bot API.
pub struct TelegramGateway {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl TelegramGateway {
    pub fn new(token: impl Into<String>) -> std::result::Result<Self, ServerError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ServerError::Gateway("bot token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServerError::Gateway(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            api_base: API_BASE.to_string(),
        })
    }

    /// Point the gateway at a different API origin (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call("sendMessage", &SendMessageRequest { chat_id, text })
            .await
    }

    pub async fn send_voice(&self, chat_id: i64, voice: &str) -> Result<()> {
        self.call("sendVoice", &SendVoiceRequest { chat_id, voice })
            .await
    }

    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<()> {
        self.call("sendChatAction", &SendChatActionRequest { chat_id, action })
            .await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        self.call("setWebhook", &SetWebhookRequest { url }).await
    }

    async fn call<T: Serialize>(&self, method: &str, body: &T) -> Result<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            // without_url: the request URL embeds the bot token.
            .map_err(|e| Error::Gateway(format!("{} failed: {}", method, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Gateway(format!(
                "{} HTTP {}: {}",
                method, status, error_text
            )));
        }

        Ok(())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

/// Relays reply envelopes into one Telegram chat.
///
/// Webhook sessions have no liveness signal, so `is_connected` keeps
/// its always-true default.
pub struct TelegramSink {
    gateway: Arc<TelegramGateway>,
    chat_id: i64,
    public_base: Option<String>,
}

impl TelegramSink {
    pub fn new(gateway: Arc<TelegramGateway>, chat_id: i64, public_base: Option<String>) -> Self {
        Self {
            gateway,
            chat_id,
            public_base,
        }
    }

    /// Cached audio URLs are server-relative; the Bot API needs them
    /// absolute. Without a public base there is nothing to send.
    fn absolute_voice_url(&self, voice_url: &str) -> Option<String> {
        if voice_url.starts_with("http://") || voice_url.starts_with("https://") {
            return Some(voice_url.to_string());
        }
        self.public_base
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), voice_url))
    }
}

#[async_trait]
impl Outbound for TelegramSink {
    async fn send(&self, envelope: &Envelope) -> Result<()> {
        match envelope {
            Envelope::Typing { typing: true } => {
                self.gateway.send_chat_action(self.chat_id, "typing").await
            }
            // Chat actions expire on their own; there is nothing to cancel.
            Envelope::Typing { typing: false } => Ok(()),
            Envelope::Message {
                text, voice_url, ..
            } => {
                self.gateway.send_message(self.chat_id, text).await?;

                if let Some(url) = voice_url {
                    match self.absolute_voice_url(url) {
                        Some(absolute) => {
                            // Text already went out; a failed voice note
                            // does not fail the turn.
                            if let Err(e) = self.gateway.send_voice(self.chat_id, &absolute).await {
                                tracing::warn!(
                                    chat_id = self.chat_id,
                                    error = %e,
                                    "voice delivery failed, text was sent"
                                );
                            }
                        }
                        None => {
                            tracing::debug!(
                                chat_id = self.chat_id,
                                "no public base url, skipping voice note"
                            );
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

/// Incoming webhook update, reduced to the fields the agent reads.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct SendVoiceRequest<'a> {
    chat_id: i64,
    voice: &'a str,
}

#[derive(Serialize)]
struct SendChatActionRequest<'a> {
    chat_id: i64,
    action: &'a str,
}

#[derive(Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
}
