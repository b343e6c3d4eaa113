//! Mood taxonomy used by the classifier and the persona layer.

use serde::{Deserialize, Serialize};

/// Detected user mood.
///
/// Variant order is significant: when two moods score equally the one
/// declared first wins, so keep this order stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Stressed,
    Angry,
    Anxious,
    Excited,
    Bored,
    Romantic,
    Tired,
    #[default]
    Neutral,
}

impl Mood {
    /// Stable string tag, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Stressed => "stressed",
            Mood::Angry => "angry",
            Mood::Anxious => "anxious",
            Mood::Excited => "excited",
            Mood::Bored => "bored",
            Mood::Romantic => "romantic",
            Mood::Tired => "tired",
            Mood::Neutral => "neutral",
        }
    }

    /// Parse a loosely formatted tag ("Happy", " stressed ").
    pub fn from_str_loose(s: &str) -> Option<Mood> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "stressed" => Some(Mood::Stressed),
            "angry" => Some(Mood::Angry),
            "anxious" => Some(Mood::Anxious),
            "excited" => Some(Mood::Excited),
            "bored" => Some(Mood::Bored),
            "romantic" => Some(Mood::Romantic),
            "tired" => Some(Mood::Tired),
            "neutral" => Some(Mood::Neutral),
            _ => None,
        }
    }

    /// All moods in scoring order.
    pub fn all() -> &'static [Mood] {
        &[
            Mood::Happy,
            Mood::Sad,
            Mood::Stressed,
            Mood::Angry,
            Mood::Anxious,
            Mood::Excited,
            Mood::Bored,
            Mood::Romantic,
            Mood::Tired,
            Mood::Neutral,
        ]
    }

    /// Moods that read as negative affect.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Mood::Sad | Mood::Stressed | Mood::Angry | Mood::Anxious | Mood::Tired
        )
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How strongly the mood comes through in the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodIntensity {
    #[default]
    Low,
    Medium,
    High,
}

impl MoodIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodIntensity::Low => "low",
            MoodIntensity::Medium => "medium",
            MoodIntensity::High => "high",
        }
    }

    /// Numeric level on a 0..=10 scale, used for memory importance.
    pub fn level(&self) -> u8 {
        match self {
            MoodIntensity::Low => 2,
            MoodIntensity::Medium => 5,
            MoodIntensity::High => 9,
        }
    }
}

impl std::fmt::Display for MoodIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified mood together with its intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodReading {
    pub mood: Mood,
    pub intensity: MoodIntensity,
}

impl MoodReading {
    pub fn new(mood: Mood, intensity: MoodIntensity) -> Self {
        Self { mood, intensity }
    }

    /// The reading produced when nothing in the text scores.
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Direction of the user's mood over recent turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl MoodTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTrend::Positive => "positive_trend",
            MoodTrend::Neutral => "neutral_trend",
            MoodTrend::Negative => "negative_trend",
        }
    }
}

impl std::fmt::Display for MoodTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
