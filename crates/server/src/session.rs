//! Session registry
//!
//! One live session per user, shared by the WebSocket and webhook
//! transports. Each entry pairs the session state with the outbound
//! sink a reply should go to. Idle sessions are reaped by a background
//! task so webhook users, who never disconnect explicitly, still get a
//! `session_end` event.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;

use niyati_agent::{Outbound, Session};
use niyati_core::{Envelope, EventKind, MemoryStore, SpeechSynthesizer, UserProfile};

use crate::ServerError;

const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    session: Arc<Session>,
    sink: Arc<dyn Outbound>,
}

/// Session registry keyed by user id.
pub struct SessionManager {
    entries: RwLock<HashMap<String, SessionEntry>>,
    store: Arc<dyn MemoryStore>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            store,
            speech: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_timeout,
            cleanup_interval,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Attach a synthesizer so `broadcast` can carry voice notes.
    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Register a session for the user, replacing any existing one.
    /// A replaced session is closed so its in-flight turn cancels.
    pub async fn connect(
        &self,
        profile: UserProfile,
        sink: Arc<dyn Outbound>,
    ) -> Result<Arc<Session>, ServerError> {
        let user_id = profile.user_id.clone();

        if !self.contains(&user_id) && self.count() >= self.max_sessions {
            self.cleanup_expired().await;
            if self.count() >= self.max_sessions {
                return Err(ServerError::Session("session capacity reached".to_string()));
            }
        }

        let session = Arc::new(Session::new(profile));
        let replaced = {
            let mut entries = self.entries.write();
            entries.insert(
                user_id.clone(),
                SessionEntry {
                    session: session.clone(),
                    sink,
                },
            )
        };

        if let Some(old) = replaced {
            old.session.close();
            tracing::debug!(user_id = %user_id, "closed replaced session");
            self.record_event(&user_id, EventKind::SessionEnd).await;
        }
        self.record_event(&user_id, EventKind::SessionStart).await;

        tracing::info!(user_id = %user_id, sessions = self.count(), "session connected");
        Ok(session)
    }

    /// Remove the user's session and record the end of the visit.
    pub async fn disconnect(&self, user_id: &str) {
        let removed = self.entries.write().remove(user_id);
        self.close_entry(user_id, removed).await;
    }

    /// Remove the user's session only if it is still the given one.
    /// A connection that was replaced must not tear down its successor.
    pub async fn disconnect_session(&self, user_id: &str, session: &Arc<Session>) {
        let removed = {
            let mut entries = self.entries.write();
            match entries.get(user_id) {
                Some(entry) if Arc::ptr_eq(&entry.session, session) => entries.remove(user_id),
                _ => None,
            }
        };
        self.close_entry(user_id, removed).await;
    }

    async fn close_entry(&self, user_id: &str, removed: Option<SessionEntry>) {
        if let Some(entry) = removed {
            entry.session.close();
            self.record_event(user_id, EventKind::SessionEnd).await;
            tracing::info!(
                user_id = %user_id,
                turns = entry.session.turn_count(),
                "session closed"
            );
        }
    }

    /// The session and the sink replies should be delivered to.
    pub fn get(&self, user_id: &str) -> Option<(Arc<Session>, Arc<dyn Outbound>)> {
        let entries = self.entries.read();
        entries
            .get(user_id)
            .map(|e| (e.session.clone(), e.sink.clone()))
    }

    /// Push a server-initiated message to a connected user. With
    /// `include_voice` the text is synthesized in the session's current
    /// mood; synthesis failure degrades to text only.
    pub async fn broadcast(
        &self,
        user_id: &str,
        text: &str,
        include_voice: bool,
    ) -> Result<(), ServerError> {
        let (session, sink) = self
            .get(user_id)
            .ok_or_else(|| ServerError::Session(format!("no active session for {}", user_id)))?;

        let voice_url = if include_voice {
            match &self.speech {
                Some(speech) => match speech.synthesize(text, session.current_mood()).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!(
                            user_id = %user_id,
                            error = %e,
                            "broadcast voice synthesis failed, sending text only"
                        );
                        None
                    }
                },
                None => None,
            }
        } else {
            None
        };

        sink.send(&Envelope::message(text, voice_url))
            .await
            .map_err(|e| ServerError::Gateway(format!("broadcast delivery failed: {}", e)))
    }

    /// Toggle the typing indicator for a connected user.
    pub async fn typing(&self, user_id: &str, on: bool) -> Result<(), ServerError> {
        let (_, sink) = self
            .get(user_id)
            .ok_or_else(|| ServerError::Session(format!("no active session for {}", user_id)))?;

        sink.send(&Envelope::typing(on))
            .await
            .map_err(|e| ServerError::Gateway(format!("typing delivery failed: {}", e)))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.read().contains_key(user_id)
    }

    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Drop sessions idle past the timeout. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let expired: Vec<String> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter(|(_, e)| e.session.is_expired(self.session_timeout))
                .map(|(id, _)| id.clone())
                .collect()
        };

        let count = expired.len();
        for id in expired {
            tracing::info!(user_id = %id, "session idle timeout");
            self.disconnect(&id).await;
        }
        count
    }

    /// Start a background task that periodically reaps idle sessions.
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = manager.cleanup_expired().await;
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = manager.count(),
                                "cleaned up idle sessions"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    async fn record_event(&self, user_id: &str, kind: EventKind) {
        if let Err(e) = self.store.append_event(user_id, kind).await {
            tracing::debug!(user_id = %user_id, error = %e, "failed to record session event");
        }
    }
}
