//! In-memory store, used when Supabase is not configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use niyati_core::{
    Error, EventKind, MemoryStore, MoodPatterns, Preference, Result, SessionEvent, SpecialMemory,
    TurnRecord, UserProfile,
};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::patterns::compute_patterns;

const SEARCH_LIMIT: usize = 5;
const PATTERN_WINDOW_DAYS: i64 = 30;

/// Volatile [`MemoryStore`]. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserProfile>>,
    turns: RwLock<Vec<TurnRecord>>,
    preferences: RwLock<HashMap<(String, String), Preference>>,
    memories: RwLock<Vec<SpecialMemory>>,
    events: RwLock<Vec<SessionEvent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_count(&self) -> usize {
        self.turns.read().len()
    }

    pub fn special_memories(&self, user_id: &str) -> Vec<SpecialMemory> {
        self.memories
            .read()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn events_for(&self, user_id: &str) -> Vec<SessionEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn preference_of(&self, user_id: &str, preference_type: &str) -> Option<Preference> {
        self.preferences
            .read()
            .get(&(user_id.to_string(), preference_type.to_string()))
            .cloned()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn create_user(&self, username: &str, display_name: &str) -> Result<UserProfile> {
        let profile = UserProfile::new(Uuid::new_v4().to_string(), display_name)
            .with_username(username);
        self.users
            .write()
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    async fn load_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile> {
        if let Some(profile) = self.users.read().get(user_id) {
            return Ok(profile.clone());
        }

        let profile = UserProfile::new(user_id, display_name.unwrap_or("dost"));
        self.users
            .write()
            .insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }

    async fn touch_last_active(&self, user_id: &str) -> Result<()> {
        let mut users = self.users.write();
        let profile = users
            .get_mut(user_id)
            .ok_or_else(|| Error::Store(format!("unknown user {}", user_id)))?;
        profile.last_active = Utc::now();
        Ok(())
    }

    async fn append_turn(&self, turn: &TurnRecord) -> Result<()> {
        let mut stored = turn.clone();
        stored.message_id = Some(Uuid::new_v4());
        self.turns.write().push(stored);
        Ok(())
    }

    async fn search_memories(&self, user_id: &str, query: &str) -> Result<Vec<TurnRecord>> {
        let needle = query.to_lowercase();
        let turns = self.turns.read();
        let mut hits: Vec<TurnRecord> = turns
            .iter()
            .filter(|t| t.user_id == user_id && t.user_text.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.reverse();
        hits.truncate(SEARCH_LIMIT);
        Ok(hits)
    }

    async fn get_recent(&self, user_id: &str, n: usize) -> Result<Vec<TurnRecord>> {
        let turns = self.turns.read();
        let mut recent: Vec<TurnRecord> = turns
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        recent.sort_by_key(|t| t.timestamp);
        recent.reverse();
        recent.truncate(n);
        Ok(recent)
    }

    async fn get_patterns(&self, user_id: &str) -> Result<MoodPatterns> {
        let cutoff = Utc::now() - Duration::days(PATTERN_WINDOW_DAYS);
        let turns = self.turns.read();
        let mut window: Vec<TurnRecord> = turns
            .iter()
            .filter(|t| t.user_id == user_id && t.timestamp > cutoff)
            .cloned()
            .collect();
        window.sort_by_key(|t| t.timestamp);
        Ok(compute_patterns(&window))
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        preference_type: &str,
        value: &str,
        weight: f32,
    ) -> Result<()> {
        let preference = Preference {
            user_id: user_id.to_string(),
            preference_type: preference_type.to_string(),
            value: value.to_string(),
            weight,
            updated_at: Utc::now(),
        };
        self.preferences.write().insert(
            (user_id.to_string(), preference_type.to_string()),
            preference,
        );
        Ok(())
    }

    async fn add_special_memory(&self, memory: &SpecialMemory) -> Result<()> {
        self.memories.write().push(memory.clone());
        Ok(())
    }

    async fn append_event(&self, user_id: &str, kind: EventKind) -> Result<()> {
        self.events.write().push(SessionEvent::new(user_id, kind));
        Ok(())
    }
}
