//! Language detection and conversational filler injection.

use niyati_core::language::contains_devanagari;
use niyati_core::Language;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Romanized Hindi words that mark a message as Hindi or Hinglish.
/// Closed set, matched case-insensitively against whitespace tokens.
pub const HINDI_LEXICON: [&str; 16] = [
    "yaar", "kya", "hai", "nahi", "accha", "theek", "kaise", "kyun", "abhi", "aur", "bas", "mat",
    "kar", "tha", "gaya", "aaya",
];

/// Classify the language register of a message.
///
/// Any Devanagari character decides Hindi outright. Otherwise tokens are
/// matched against the romanized lexicon: more than half Hindi means
/// Hindi, at least one means Hinglish, none means English.
pub fn classify_language(text: &str) -> Language {
    if contains_devanagari(text) {
        return Language::Hindi;
    }

    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Language::English;
    }

    let hindi_hits = tokens
        .iter()
        .filter(|t| HINDI_LEXICON.contains(&t.as_str()))
        .count();

    if hindi_hits * 2 > tokens.len() {
        Language::Hindi
    } else if hindi_hits >= 1 {
        Language::Hinglish
    } else {
        Language::English
    }
}

const FILLERS_ENGLISH: &[&str] = &["like", "you know", "I mean", "umm", "basically", "literally"];
const FILLERS_HINDI: &[&str] = &["matlab", "vaise", "haan toh", "arre", "bas", "na"];
const FILLERS_HINGLISH: &[&str] = &["yaar", "matlab", "like", "na", "arre", "basically"];

const STARTERS_ENGLISH: &[&str] = &["okay so", "honestly", "listen", "by the way", "anyway"];
const STARTERS_HINDI: &[&str] = &["accha", "arre haan", "vaise", "suno", "matlab"];
const STARTERS_HINGLISH: &[&str] = &["accha", "arre", "vaise", "okay so", "suno na"];

fn fillers_for(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => FILLERS_ENGLISH,
        Language::Hindi => FILLERS_HINDI,
        Language::Hinglish => FILLERS_HINGLISH,
    }
}

fn starters_for(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => STARTERS_ENGLISH,
        Language::Hindi => STARTERS_HINDI,
        Language::Hinglish => STARTERS_HINGLISH,
    }
}

/// Makes generated replies read like casual texting by slipping in
/// spoken-language fillers and sentence starters.
pub struct FillerInjector {
    rng: Mutex<StdRng>,
}

impl FillerInjector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Rewrite `text` with language-matched fillers.
    ///
    /// Per sentence: 30% chance of one filler at an interior word
    /// position, and for every sentence after the first a 20% chance of
    /// a capitalized comma-separated starter.
    pub fn inject(&self, text: &str, language: Language) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return text.to_string();
        }

        let mut rng = self.rng.lock();
        let fillers = fillers_for(language);
        let starters = starters_for(language);

        let mut out: Vec<String> = Vec::with_capacity(sentences.len());
        for (idx, sentence) in sentences.iter().enumerate() {
            let mut sentence = sentence.clone();

            if rng.gen_bool(0.3) {
                let mut words: Vec<String> =
                    sentence.split_whitespace().map(str::to_string).collect();
                if words.len() >= 3 {
                    let filler = fillers[rng.gen_range(0..fillers.len())];
                    let pos = rng.gen_range(1..words.len());
                    words.insert(pos, filler.to_string());
                    sentence = words.join(" ");
                }
            }

            if idx > 0 && rng.gen_bool(0.2) {
                let starter = starters[rng.gen_range(0..starters.len())];
                sentence = format!("{}, {}", capitalize(starter), lowercase_first(&sentence));
            }

            out.push(sentence);
        }

        out.join(" ")
    }
}

impl Default for FillerInjector {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into sentences, keeping terminators attached.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
