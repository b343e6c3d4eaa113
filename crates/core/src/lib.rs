//! Core types for the Niyati conversational agent.
//!
//! Everything the service crates share lives here: the mood and language
//! taxonomies, conversation and persistence records, client wire
//! envelopes, backend traits and the common error type.

pub mod conversation;
pub mod envelope;
pub mod error;
pub mod language;
pub mod mood;
pub mod records;
pub mod traits;

pub use conversation::{BufferEntry, TurnRole};
pub use envelope::{Envelope, InboundMessage};
pub use error::{Error, Result};
pub use language::Language;
pub use mood::{Mood, MoodIntensity, MoodReading, MoodTrend};
pub use records::{
    EventKind, MemoryKind, MoodPatterns, Preference, SessionEvent, SpecialMemory, TurnRecord,
    UserProfile,
};
pub use traits::{ChatModel, MemoryStore, SpeechSynthesizer};
