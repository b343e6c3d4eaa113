//! Language tags for the bilingual Hindi/English user base.

use serde::{Deserialize, Serialize};

/// Language register of a message or reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Hindi,
    /// Romanized Hindi mixed with English, the default register.
    #[default]
    Hinglish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Hinglish => "hinglish",
        }
    }

    /// BCP-47 style code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Hinglish => "hi-en",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "hindi" | "hi" => Some(Language::Hindi),
            "hinglish" | "hi-en" => Some(Language::Hinglish),
            _ => None,
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::English, Language::Hindi, Language::Hinglish]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unicode block for Devanagari script.
pub const DEVANAGARI_RANGE: (u32, u32) = (0x0900, 0x097F);

/// Whether a character falls in the Devanagari block.
pub fn is_devanagari(c: char) -> bool {
    let cp = c as u32;
    cp >= DEVANAGARI_RANGE.0 && cp <= DEVANAGARI_RANGE.1
}

/// Whether any character of the text is Devanagari script.
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}
