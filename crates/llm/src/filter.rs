//! Response post-filter.
//!
//! The model occasionally slips out of character. Sentences that admit
//! to being software are cut before anything else sees the text, then
//! the reply is trimmed to texting length.

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentences matching any of these never leave the pipeline.
static SELF_REFERENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)as an ai.*?[.!]",
        r"(?i)i'm an ai.*?[.!]",
        r"(?i)artificial intelligence.*?[.!]",
        r"(?i)language model.*?[.!]",
        r"(?i)i don't have.*feelings.*?[.!]",
        r"(?i)i cannot.*?[.!]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("hardcoded pattern compiles"))
    .collect()
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("hardcoded pattern compiles"));

const MAX_SENTENCES: usize = 3;

/// Strip out-of-character sentences, cap the reply at three sentences
/// and collapse whitespace. May return an empty string when everything
/// was filtered; callers substitute a fallback utterance.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.to_string();
    for pattern in SELF_REFERENCE_PATTERNS.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }

    let text = truncate_sentences(&text, MAX_SENTENCES);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn truncate_sentences(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut count = 0;

    for c in text.chars() {
        out.push(c);
        if matches!(c, '.' | '!' | '?') {
            count += 1;
            if count >= max {
                break;
            }
        }
    }

    out
}
