//! Backend traits implemented by the service crates.
//!
//! The orchestrator holds these as trait objects so tests can swap in
//! mocks and the server can pick implementations at startup.

use async_trait::async_trait;

use crate::error::Result;
use crate::mood::Mood;
use crate::records::{EventKind, MoodPatterns, SpecialMemory, TurnRecord, UserProfile};

/// A text-generation backend.
#[async_trait]
pub trait ChatModel: Send + Sync + 'static {
    /// Generate a reply for a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier used in logs.
    fn model_name(&self) -> &str;
}

/// A speech-synthesis backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize the text with mood-appropriate delivery and return a
    /// serveable audio reference (e.g. "/audio/<key>.mp3").
    async fn synthesize(&self, text: &str, mood: Mood) -> Result<String>;
}

/// Long-term conversation memory.
///
/// Store failures on the reply path are logged and skipped rather than
/// surfaced to the user, so implementations should return errors freely.
#[async_trait]
pub trait MemoryStore: Send + Sync + 'static {
    /// Create a user row with a generated id.
    async fn create_user(&self, username: &str, display_name: &str) -> Result<UserProfile>;

    /// Fetch a profile, creating it when absent. `display_name` seeds the
    /// new row; when None a placeholder is used.
    async fn load_profile(&self, user_id: &str, display_name: Option<&str>)
        -> Result<UserProfile>;

    /// Bump the profile's last-active timestamp.
    async fn touch_last_active(&self, user_id: &str) -> Result<()>;

    /// Persist one completed exchange.
    async fn append_turn(&self, turn: &TurnRecord) -> Result<()>;

    /// Up to 5 past turns relevant to the query, falling back to recent
    /// turns when text search is unavailable.
    async fn search_memories(&self, user_id: &str, query: &str) -> Result<Vec<TurnRecord>>;

    /// Last `n` turns, most recent first.
    async fn get_recent(&self, user_id: &str, n: usize) -> Result<Vec<TurnRecord>>;

    /// Mood aggregates over the last 30 days.
    async fn get_patterns(&self, user_id: &str) -> Result<MoodPatterns>;

    /// Insert or update a preference keyed by (user, type).
    async fn upsert_preference(
        &self,
        user_id: &str,
        preference_type: &str,
        value: &str,
        weight: f32,
    ) -> Result<()>;

    /// Persist a high-importance memory.
    async fn add_special_memory(&self, memory: &SpecialMemory) -> Result<()>;

    /// Record a session lifecycle event.
    async fn append_event(&self, user_id: &str, kind: EventKind) -> Result<()>;
}
