//! Keyword-based mood classification.
//!
//! Runs locally on every message so the pipeline never waits on a model
//! call to know how the user feels. Signals are weighted (keyword 1,
//! phrase 2, emoji 3) and the highest-scoring mood wins; nothing scoring
//! means neutral.

use niyati_core::{BufferEntry, Mood, MoodIntensity, MoodReading, MoodTrend};

struct Signals {
    keywords: &'static [&'static str],
    phrases: &'static [&'static str],
    emojis: &'static [&'static str],
}

const HAPPY_SIGNALS: Signals = Signals {
    keywords: &[
        "happy", "glad", "great", "awesome", "amazing", "yay", "wonderful", "haha", "hehe", "lol",
        "khush", "mast", "badhiya",
    ],
    phrases: &["so good", "feeling great", "best day", "love it", "bahut accha"],
    emojis: &["😊", "😄", "😁", "🥳", "😍", "😂", "🤣", "✨"],
};

const SAD_SIGNALS: Signals = Signals {
    keywords: &[
        "sad", "upset", "cry", "crying", "lonely", "hurt", "miss", "dukhi", "udaas", "akela",
    ],
    phrases: &["feel like crying", "so sad", "miss you", "not okay", "bura lag raha"],
    emojis: &["😢", "😭", "💔", "🥺", "☹️"],
};

const STRESSED_SIGNALS: Signals = Signals {
    keywords: &[
        "stressed", "stress", "pressure", "exams", "deadline", "tension", "overwhelmed", "panic",
        "pareshan",
    ],
    phrases: &[
        "so much work",
        "can't handle",
        "too much pressure",
        "exam stress",
        "kitna kaam",
    ],
    emojis: &["😩", "😫", "😰", "🤯"],
};

const ANGRY_SIGNALS: Signals = Signals {
    keywords: &["angry", "furious", "annoyed", "irritated", "hate", "mad", "ugh", "gussa"],
    phrases: &["so annoying", "fed up", "can't stand", "gussa aa raha"],
    emojis: &["😡", "😠", "🤬"],
};

const ANXIOUS_SIGNALS: Signals = Signals {
    keywords: &[
        "anxious", "nervous", "worried", "scared", "afraid", "anxiety", "darr", "ghabrahat",
    ],
    phrases: &[
        "what if",
        "can't stop thinking",
        "really worried",
        "darr lag raha",
    ],
    emojis: &["😨", "😟", "😬"],
};

const EXCITED_SIGNALS: Signals = Signals {
    keywords: &["excited", "wow", "omg", "finally", "yesss", "woohoo"],
    phrases: &["can't wait", "so excited", "guess what", "big news"],
    emojis: &["🤩", "🎉", "🔥", "⚡", "🙌"],
};

const BORED_SIGNALS: Signals = Signals {
    keywords: &["bored", "boring", "meh", "dull", "bakwas", "timepass"],
    phrases: &["so bored", "nothing to do", "time pass", "kuch nahi"],
    emojis: &["🥱", "😑", "🙄"],
};

const ROMANTIC_SIGNALS: Signals = Signals {
    keywords: &["love", "crush", "cute", "date", "sweet", "miss", "pyaar", "dil"],
    phrases: &["i like someone", "so cute", "pyaar ho gaya", "miss kar"],
    emojis: &["❤️", "😘", "💕", "🥰"],
};

const TIRED_SIGNALS: Signals = Signals {
    keywords: &["tired", "sleepy", "exhausted", "drained", "thaka", "neend", "sona"],
    phrases: &["so tired", "need sleep", "no energy", "neend aa rahi"],
    emojis: &["😴", "💤", "🛌"],
};

const NO_SIGNALS: Signals = Signals {
    keywords: &[],
    phrases: &[],
    emojis: &[],
};

fn signals_for(mood: Mood) -> &'static Signals {
    match mood {
        Mood::Happy => &HAPPY_SIGNALS,
        Mood::Sad => &SAD_SIGNALS,
        Mood::Stressed => &STRESSED_SIGNALS,
        Mood::Angry => &ANGRY_SIGNALS,
        Mood::Anxious => &ANXIOUS_SIGNALS,
        Mood::Excited => &EXCITED_SIGNALS,
        Mood::Bored => &BORED_SIGNALS,
        Mood::Romantic => &ROMANTIC_SIGNALS,
        Mood::Tired => &TIRED_SIGNALS,
        Mood::Neutral => &NO_SIGNALS,
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "happy", "love", "awesome", "amazing", "nice", "fun", "best", "excited",
    "yay", "badhiya", "mast", "accha",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "sad", "hate", "tired", "stressed", "angry", "worst", "cry", "lonely", "upset",
    "scared", "bura", "pareshan", "thaka",
];

/// Local mood classifier over keyword, phrase and emoji signal tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoodClassifier;

impl MoodClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single message.
    pub fn classify(&self, text: &str) -> MoodReading {
        let lower = text.to_lowercase();
        let moods = Mood::all();
        let mut scores = vec![0i32; moods.len()];

        for (idx, mood) in moods.iter().enumerate() {
            let signals = signals_for(*mood);
            let mut score = 0i32;
            for keyword in signals.keywords {
                score += lower.matches(keyword).count() as i32;
            }
            for phrase in signals.phrases {
                score += 2 * lower.matches(phrase).count() as i32;
            }
            for emoji in signals.emojis {
                score += 3 * text.matches(emoji).count() as i32;
            }
            scores[idx] = score;
        }

        let exclamations = text.matches('!').count();
        if exclamations > 2 {
            if leading_mood(moods, &scores) == Some(Mood::Happy) {
                scores[mood_index(Mood::Excited)] += 2;
            } else {
                scores[mood_index(Mood::Stressed)] += 1;
            }
        }

        let emojis = emoji_count(text);
        if emojis > 2 {
            scores[mood_index(Mood::Excited)] += 1;
        }

        let mood = leading_mood(moods, &scores).unwrap_or(Mood::Neutral);
        MoodReading::new(mood, intensity_of(text, emojis))
    }

    /// Classify a message and report the mood trend over recent user
    /// turns (the current message counts as the most recent).
    pub fn classify_with_history(
        &self,
        text: &str,
        history: &[BufferEntry],
    ) -> (MoodReading, MoodTrend) {
        let reading = self.classify(text);

        let mut recent: Vec<&str> = history
            .iter()
            .filter(|e| e.is_user())
            .map(|e| e.content.as_str())
            .collect();
        recent.push(text);
        let window = &recent[recent.len().saturating_sub(5)..];

        let sum: f32 = window.iter().map(|t| polarity(t)).sum();
        let avg = sum / window.len() as f32;

        let trend = if avg > 0.3 {
            MoodTrend::Positive
        } else if avg < -0.3 {
            MoodTrend::Negative
        } else {
            MoodTrend::Neutral
        };

        (reading, trend)
    }
}

/// Highest strictly-positive score wins; earlier moods win ties.
fn leading_mood(moods: &[Mood], scores: &[i32]) -> Option<Mood> {
    let mut best: Option<(Mood, i32)> = None;
    for (idx, mood) in moods.iter().enumerate() {
        let score = scores[idx];
        if score > 0 && best.map_or(true, |(_, b)| score > b) {
            best = Some((*mood, score));
        }
    }
    best.map(|(m, _)| m)
}

fn mood_index(mood: Mood) -> usize {
    Mood::all()
        .iter()
        .position(|m| *m == mood)
        .unwrap_or_default()
}

/// Intensity from surface features:
/// 2 * caps ratio + 3 * exclamation density + 0.1 * emoji count.
fn intensity_of(text: &str, emojis: usize) -> MoodIntensity {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    let caps_ratio = if letters.is_empty() {
        0.0
    } else {
        letters.iter().filter(|c| c.is_uppercase()).count() as f32 / letters.len() as f32
    };

    let total_chars = text.chars().count();
    let excl_ratio = if total_chars == 0 {
        0.0
    } else {
        text.matches('!').count() as f32 / total_chars as f32
    };

    let score = 2.0 * caps_ratio + 3.0 * excl_ratio + 0.1 * emojis as f32;

    if score < 0.3 {
        MoodIntensity::Low
    } else if score < 0.7 {
        MoodIntensity::Medium
    } else {
        MoodIntensity::High
    }
}

fn emoji_count(text: &str) -> usize {
    text.chars().filter(|c| is_emoji(*c)).count()
}

fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    (0x1F300..=0x1FAFF).contains(&cp) || (0x2600..=0x27BF).contains(&cp)
}

/// Per-message sentiment in [-1, 1] from the polarity lexicons.
fn polarity(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let pos = POSITIVE_WORDS
        .iter()
        .map(|w| lower.matches(w).count())
        .sum::<usize>() as f32;
    let neg = NEGATIVE_WORDS
        .iter()
        .map(|w| lower.matches(w).count())
        .sum::<usize>() as f32;
    if pos + neg == 0.0 {
        0.0
    } else {
        (pos - neg) / (pos + neg)
    }
}
