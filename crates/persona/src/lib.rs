//! The Niyati persona: who she sounds like and how that adapts.
//!
//! Classification (language, mood) runs locally on every message, the
//! modulator turns the result into style knobs, and the prompt assembler
//! renders the final instruction text for the chat model.

pub mod language;
pub mod mood;
pub mod prompt;
pub mod style;

pub use language::{classify_language, FillerInjector, HINDI_LEXICON};
pub use mood::MoodClassifier;
pub use prompt::{PromptAssembler, PromptContext, MEMORY_FALLBACK};
pub use style::{
    time_of_day, Energy, PersonaModulator, Playfulness, SlangLevel, StyleConfig, Supportiveness,
};
