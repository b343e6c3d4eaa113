//! Wire envelopes exchanged with clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outbound envelope, tagged by `type`.
///
/// `Message.voice_url` serializes as `null` when no audio was produced,
/// so clients can rely on the field always being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    Message {
        text: String,
        voice_url: Option<String>,
        timestamp: DateTime<Utc>,
        typing: bool,
    },
    Typing {
        typing: bool,
    },
}

impl Envelope {
    /// A completed reply. `typing` is always false on message envelopes.
    pub fn message(text: impl Into<String>, voice_url: Option<String>) -> Self {
        Envelope::Message {
            text: text.into(),
            voice_url,
            timestamp: Utc::now(),
            typing: false,
        }
    }

    /// A typing indicator update.
    pub fn typing(on: bool) -> Self {
        Envelope::Typing { typing: on }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Envelope::Message { .. })
    }
}

/// Inbound client message. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub message: String,
}
