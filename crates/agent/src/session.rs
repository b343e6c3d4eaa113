//! Per-user session state.

use std::time::{Duration, Instant};

use niyati_core::{BufferEntry, Language, Mood, UserProfile};
use niyati_memory::ContextBuffer;
use parking_lot::{Mutex, RwLock};

/// Mutable conversation state carried across turns of one session.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub current_mood: Mood,
    pub current_language: Language,
    pub relationship_level: u8,
    pub buffer: ContextBuffer,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            current_mood: Mood::Neutral,
            current_language: Language::default(),
            relationship_level: 1,
            buffer: ContextBuffer::new(),
        }
    }
}

/// One live conversation. Created when a transport attaches, dropped
/// when it detaches or idles out; the map of these is the only place
/// session state lives.
pub struct Session {
    user_id: String,
    profile: RwLock<UserProfile>,
    created_at: Instant,
    last_activity: RwLock<Instant>,
    active: RwLock<bool>,
    /// Serializes turns per user: a second message waits for the
    /// in-flight turn to finish.
    turn_gate: tokio::sync::Mutex<()>,
    state: Mutex<ConversationState>,
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        let now = Instant::now();
        Self {
            user_id: profile.user_id.clone(),
            profile: RwLock::new(profile),
            created_at: now,
            last_activity: RwLock::new(now),
            active: RwLock::new(true),
            turn_gate: tokio::sync::Mutex::new(()),
            state: Mutex::new(ConversationState::default()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.read().clone()
    }

    pub fn set_profile(&self, profile: UserProfile) {
        *self.profile.write() = profile;
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Record activity, resetting the idle clock.
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    pub fn close(&self) {
        *self.active.write() = false;
    }

    pub fn is_active(&self) -> bool {
        *self.active.read()
    }

    /// Acquire the per-user turn lock.
    pub async fn lock_turn(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.turn_gate.lock().await
    }

    /// Apply a classified user message: update mood and language, push
    /// the buffer entry.
    pub fn note_user_turn(&self, mood: Mood, language: Language, entry: BufferEntry) {
        let mut state = self.state.lock();
        state.current_mood = mood;
        state.current_language = language;
        state.buffer.push(entry);
    }

    /// Push the assistant's reply into the buffer.
    pub fn note_assistant_turn(&self, entry: BufferEntry) {
        self.state.lock().buffer.push(entry);
    }

    /// Last `n` buffer entries, oldest first.
    pub fn recent_entries(&self, n: usize) -> Vec<BufferEntry> {
        self.state.lock().buffer.last_n(n)
    }

    /// Buffer length, which doubles as the conversation depth.
    pub fn turn_count(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn current_mood(&self) -> Mood {
        self.state.lock().current_mood
    }

    pub fn current_language(&self) -> Language {
        self.state.lock().current_language
    }

    pub fn relationship_level(&self) -> u8 {
        self.state.lock().relationship_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(UserProfile::new("u1", "Asha"))
    }

    #[test]
    fn test_new_session_defaults() {
        let session = session();
        assert_eq!(session.user_id(), "u1");
        assert!(session.is_active());
        assert_eq!(session.current_mood(), Mood::Neutral);
        assert_eq!(session.current_language(), Language::Hinglish);
        assert_eq!(session.relationship_level(), 1);
        assert_eq!(session.turn_count(), 0);
    }

    #[test]
    fn test_note_turns_update_state() {
        let session = session();
        session.note_user_turn(
            Mood::Stressed,
            Language::Hinglish,
            BufferEntry::user("exams yaar").with_mood(Mood::Stressed),
        );
        session.note_assistant_turn(BufferEntry::assistant("breathe, one thing at a time"));

        assert_eq!(session.current_mood(), Mood::Stressed);
        assert_eq!(session.turn_count(), 2);

        let recent = session.recent_entries(5);
        assert_eq!(recent[0].content, "exams yaar");
        assert_eq!(recent[1].content, "breathe, one thing at a time");
    }

    #[test]
    fn test_expiry() {
        let session = session();
        assert!(!session.is_expired(Duration::from_secs(60)));
        assert!(session.is_expired(Duration::from_nanos(1)));
        session.touch();
        assert!(!session.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_close() {
        let session = session();
        session.close();
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_turn_gate_serializes() {
        let session = std::sync::Arc::new(session());
        let guard = session.lock_turn().await;

        let contender = session.clone();
        let handle = tokio::spawn(async move {
            let _guard = contender.lock_turn().await;
        });

        // The second lock attempt parks until the guard drops.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(guard);
        handle.await.unwrap();
    }
}
