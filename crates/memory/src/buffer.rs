//! Rolling in-session conversation buffer.

use std::collections::VecDeque;

use niyati_core::BufferEntry;

/// Fixed-capacity FIFO of the most recent conversation entries.
///
/// User and assistant entries both count toward the capacity; pushing
/// the 21st entry silently drops the oldest.
#[derive(Debug, Clone, Default)]
pub struct ContextBuffer {
    entries: VecDeque<BufferEntry>,
}

impl ContextBuffer {
    pub const CAP: usize = 20;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAP),
        }
    }

    pub fn push(&mut self, entry: BufferEntry) {
        if self.entries.len() == Self::CAP {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `n` entries, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<BufferEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferEntry> {
        self.entries.iter()
    }
}
