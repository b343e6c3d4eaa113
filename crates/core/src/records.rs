//! Row types persisted in the long-term memory store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;
use crate::mood::Mood;

/// Stored user profile, one row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub preferred_language: Language,
    /// Free-form delivery preference, e.g. "text_only".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_preference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            username: None,
            preferred_language: Language::default(),
            mood_preference: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.preferred_language = language;
        self
    }
}

/// One completed exchange: what the user said and what the agent replied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Assigned by the store on insert; absent on the write path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    pub user_id: String,
    pub user_text: String,
    pub bot_text: String,
    pub detected_mood: Mood,
    pub language: Language,
    #[serde(default)]
    pub topics: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl TurnRecord {
    pub fn new(
        user_id: impl Into<String>,
        user_text: impl Into<String>,
        bot_text: impl Into<String>,
        detected_mood: Mood,
        language: Language,
    ) -> Self {
        Self {
            message_id: None,
            user_id: user_id.into(),
            user_text: user_text.into(),
            bot_text: bot_text.into(),
            detected_mood,
            language,
            topics: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }
}

/// Kinds of long-term memories, ordered by how much they matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Special,
    Emotional,
    Preference,
    Routine,
    Casual,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Special => "special",
            MemoryKind::Emotional => "emotional",
            MemoryKind::Preference => "preference",
            MemoryKind::Routine => "routine",
            MemoryKind::Casual => "casual",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A remembered fact worth surfacing in later conversations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMemory {
    pub user_id: String,
    pub kind: MemoryKind,
    pub content: String,
    /// 1..=10, higher means surfaced first.
    pub importance: u8,
    pub timestamp: DateTime<Utc>,
}

impl SpecialMemory {
    pub fn new(
        user_id: impl Into<String>,
        kind: MemoryKind,
        content: impl Into<String>,
        importance: u8,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            content: content.into(),
            importance,
            timestamp: Utc::now(),
        }
    }
}

/// A stored user preference, idempotent per (user, type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: String,
    pub preference_type: String,
    pub value: String,
    pub weight: f32,
    pub updated_at: DateTime<Utc>,
}

/// Session lifecycle markers written to the events table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStart,
    SessionEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStart => "session_start",
            EventKind::SessionEnd => "session_end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub user_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(user_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Aggregates over a user's recent mood history.
#[derive(Debug, Clone, Default)]
pub struct MoodPatterns {
    /// How often each mood was detected.
    pub mood_histogram: HashMap<Mood, u32>,
    /// Message counts by hour of day (0..=23).
    pub hour_histogram: HashMap<u8, u32>,
    /// Counts of mood-to-mood transitions between consecutive turns.
    pub transitions: HashMap<Mood, HashMap<Mood, u32>>,
}

impl MoodPatterns {
    pub fn is_empty(&self) -> bool {
        self.mood_histogram.is_empty()
    }

    /// The most frequently seen mood, if any history exists.
    pub fn dominant_mood(&self) -> Option<Mood> {
        Mood::all()
            .iter()
            .filter_map(|m| self.mood_histogram.get(m).map(|c| (*m, *c)))
            .max_by_key(|(_, c)| *c)
            .map(|(m, _)| m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_record_write_shape() {
        let turn = TurnRecord::new("u1", "hi", "heyy", Mood::Happy, Language::English);
        let json = serde_json::to_value(&turn).unwrap();
        // message_id is store-assigned, so the write payload omits it.
        assert!(json.get("message_id").is_none());
        assert_eq!(json["detected_mood"], "happy");
        assert_eq!(json["language"], "english");
    }

    #[test]
    fn test_profile_defaults() {
        let profile = UserProfile::new("u1", "Asha");
        assert_eq!(profile.preferred_language, Language::Hinglish);
        assert!(profile.username.is_none());
        assert_eq!(profile.created_at, profile.last_active);
    }

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(EventKind::SessionEnd.as_str(), "session_end");
        let json = serde_json::to_string(&EventKind::SessionEnd).unwrap();
        assert_eq!(json, "\"session_end\"");
    }

    #[test]
    fn test_dominant_mood() {
        let mut patterns = MoodPatterns::default();
        assert!(patterns.dominant_mood().is_none());
        patterns.mood_histogram.insert(Mood::Happy, 3);
        patterns.mood_histogram.insert(Mood::Sad, 5);
        assert_eq!(patterns.dominant_mood(), Some(Mood::Sad));
    }
}
