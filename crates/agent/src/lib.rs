//! Conversation orchestration: sessions, the outbound transport seam,
//! and the per-turn pipeline that ties classification, persona, memory,
//! generation and speech together.

pub mod orchestrator;
pub mod outbound;
pub mod session;

pub use orchestrator::{Orchestrator, TurnOutcome};
pub use outbound::Outbound;
pub use session::{ConversationState, Session};
