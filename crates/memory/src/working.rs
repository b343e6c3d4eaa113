//! Short-horizon working memory.
//!
//! Holds per-user notable events for the last 24 hours. Expired entries
//! are purged lazily on insert, so no background sweeper is needed.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use niyati_core::MemoryKind;

/// One notable event inside the working-memory horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEvent {
    pub kind: MemoryKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl MemoryEvent {
    pub fn new(kind: MemoryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Construct with an explicit timestamp (tests).
    pub fn at(kind: MemoryKind, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp,
        }
    }
}

/// Per-user event lists with a 24 hour retention horizon.
#[derive(Debug, Default)]
pub struct WorkingMemory {
    events: DashMap<String, Vec<MemoryEvent>>,
}

impl WorkingMemory {
    const HORIZON_HOURS: i64 = 24;

    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }

    /// Append an event, dropping anything older than the horizon first.
    pub fn push(&self, user_id: &str, event: MemoryEvent) {
        let cutoff = Utc::now() - Duration::hours(Self::HORIZON_HOURS);
        let mut entry = self.events.entry(user_id.to_string()).or_default();
        entry.retain(|e| e.timestamp > cutoff);
        entry.push(event);
    }

    /// Events currently inside the horizon, oldest first.
    pub fn recent(&self, user_id: &str) -> Vec<MemoryEvent> {
        let cutoff = Utc::now() - Duration::hours(Self::HORIZON_HOURS);
        self.events
            .get(user_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|e| e.timestamp > cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, user_id: &str) -> usize {
        self.recent(user_id).len()
    }

    pub fn is_empty(&self, user_id: &str) -> bool {
        self.len(user_id) == 0
    }
}
