//! Persona style modulation.
//!
//! Maps the detected mood plus time of day and conversation depth onto
//! the knobs the prompt assembler serializes, and owns the small random
//! touches (emotional markers, greetings) that keep replies human.

use niyati_core::{Mood, MoodTrend, UserProfile};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    VeryHigh,
    High,
    Medium,
    Calm,
    Low,
    Gentle,
    Chill,
    Fresh,
}

impl Energy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Energy::VeryHigh => "very_high",
            Energy::High => "high",
            Energy::Medium => "medium",
            Energy::Calm => "calm",
            Energy::Low => "low",
            Energy::Gentle => "gentle",
            Energy::Chill => "chill",
            Energy::Fresh => "fresh",
        }
    }
}

impl Default for Energy {
    fn default() -> Self {
        Energy::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Supportiveness {
    VeryHigh,
    High,
    Balanced,
}

impl Supportiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Supportiveness::VeryHigh => "very_high",
            Supportiveness::High => "high",
            Supportiveness::Balanced => "balanced",
        }
    }

    /// One step warmer; VeryHigh is the ceiling.
    pub fn raise(&self) -> Self {
        match self {
            Supportiveness::Balanced => Supportiveness::High,
            _ => Supportiveness::VeryHigh,
        }
    }
}

impl Default for Supportiveness {
    fn default() -> Self {
        Supportiveness::Balanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playfulness {
    Maximum,
    High,
    Moderate,
    Light,
    Minimal,
    None,
}

impl Playfulness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Playfulness::Maximum => "maximum",
            Playfulness::High => "high",
            Playfulness::Moderate => "moderate",
            Playfulness::Light => "light",
            Playfulness::Minimal => "minimal",
            Playfulness::None => "none",
        }
    }

    /// One step more playful. None stays None: a muted persona is
    /// never re-enabled by conversation depth.
    pub fn step_up(&self) -> Self {
        match self {
            Playfulness::Maximum => Playfulness::Maximum,
            Playfulness::High => Playfulness::Maximum,
            Playfulness::Moderate => Playfulness::High,
            Playfulness::Light => Playfulness::Moderate,
            Playfulness::Minimal => Playfulness::Light,
            Playfulness::None => Playfulness::None,
        }
    }
}

impl Default for Playfulness {
    fn default() -> Self {
        Playfulness::Moderate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlangLevel {
    Heavy,
    Moderate,
    Natural,
    Casual,
}

impl SlangLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlangLevel::Heavy => "heavy",
            SlangLevel::Moderate => "moderate",
            SlangLevel::Natural => "natural",
            SlangLevel::Casual => "casual",
        }
    }
}

impl Default for SlangLevel {
    fn default() -> Self {
        SlangLevel::Natural
    }
}

/// The style knobs a single reply is generated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub energy: Energy,
    pub supportiveness: Supportiveness,
    pub playfulness: Playfulness,
    pub slang_level: SlangLevel,
    pub include_voice: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            energy: Energy::default(),
            supportiveness: Supportiveness::default(),
            playfulness: Playfulness::default(),
            slang_level: SlangLevel::default(),
            include_voice: true,
        }
    }
}

impl StyleConfig {
    /// Base style for a mood, before time and depth overlays.
    pub fn for_mood(mood: Mood) -> Self {
        let (energy, supportiveness, playfulness, slang_level) = match mood {
            Mood::Happy => (
                Energy::High,
                Supportiveness::Balanced,
                Playfulness::High,
                SlangLevel::Moderate,
            ),
            Mood::Excited => (
                Energy::VeryHigh,
                Supportiveness::Balanced,
                Playfulness::Maximum,
                SlangLevel::Heavy,
            ),
            Mood::Sad => (
                Energy::Gentle,
                Supportiveness::VeryHigh,
                Playfulness::Minimal,
                SlangLevel::Natural,
            ),
            Mood::Stressed => (
                Energy::Calm,
                Supportiveness::VeryHigh,
                Playfulness::Light,
                SlangLevel::Natural,
            ),
            Mood::Angry => (
                Energy::Calm,
                Supportiveness::High,
                Playfulness::Minimal,
                SlangLevel::Natural,
            ),
            Mood::Anxious => (
                Energy::Gentle,
                Supportiveness::VeryHigh,
                Playfulness::Light,
                SlangLevel::Natural,
            ),
            Mood::Bored => (
                Energy::Fresh,
                Supportiveness::Balanced,
                Playfulness::High,
                SlangLevel::Moderate,
            ),
            Mood::Romantic => (
                Energy::Medium,
                Supportiveness::High,
                Playfulness::Moderate,
                SlangLevel::Natural,
            ),
            Mood::Tired => (
                Energy::Chill,
                Supportiveness::High,
                Playfulness::Minimal,
                SlangLevel::Casual,
            ),
            Mood::Neutral => (
                Energy::Medium,
                Supportiveness::Balanced,
                Playfulness::Moderate,
                SlangLevel::Natural,
            ),
        };

        Self {
            energy,
            supportiveness,
            playfulness,
            slang_level,
            include_voice: true,
        }
    }

    /// Serialize as `key: value` lines for the prompt.
    pub fn render_lines(&self) -> String {
        format!(
            "energy: {}\nsupportiveness: {}\nplayfulness: {}\nslang_level: {}\ninclude_voice: {}",
            self.energy.as_str(),
            self.supportiveness.as_str(),
            self.playfulness.as_str(),
            self.slang_level.as_str(),
            self.include_voice,
        )
    }
}

const LATE_NIGHT_START: u8 = 22;
const LATE_NIGHT_END: u8 = 6;
const DEEP_CONVERSATION_TURNS: usize = 10;

fn is_late_night(hour: u8) -> bool {
    hour >= LATE_NIGHT_START || hour < LATE_NIGHT_END
}

fn markers_for(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["hehe", "yayy", "😄"],
        Mood::Sad => &["aww", "sending hugs", "🥺"],
        Mood::Stressed => &["uff", "deep breaths", "😮‍💨"],
        Mood::Angry => &["ugh", "seriously", "😤"],
        Mood::Anxious => &["hey, it's okay", "breathe", "🫂"],
        Mood::Excited => &["omg", "yayyy", "🔥"],
        Mood::Bored => &["lol", "hmm", "😅"],
        Mood::Romantic => &["aww", "hehe", "☺️"],
        Mood::Tired => &["oof", "same honestly", "😴"],
        Mood::Neutral => &["hmm", "accha", "🙂"],
    }
}

const MORNING_GREETINGS: &[&str] = &[
    "Good morning {name}! Uth gaye finally? 😄",
    "Morning {name}! Aaj ka plan kya hai?",
    "Heyy {name}, subah subah yaad kiya? 😊",
];

const AFTERNOON_GREETINGS: &[&str] = &[
    "Hey {name}! Lunch ho gaya?",
    "Arre {name}, kya chal raha hai?",
    "Hii {name}! Bore ho rahe ho kya? 😅",
];

const EVENING_GREETINGS: &[&str] = &[
    "Heyy {name}! Din kaisa tha?",
    "Evening {name}! Chai ho gayi?",
    "Arre {name}, finally free? 😄",
];

const NIGHT_GREETINGS: &[&str] = &[
    "Itni raat ko {name}? 👀",
    "Heyy {name}, neend nahi aa rahi?",
    "Night owl {name} strikes again 😴",
];

/// Daypart label for an hour of day.
pub fn time_of_day(hour: u8) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=21 => "evening",
        _ => "night",
    }
}

/// Produces the style for each turn and the random persona touches.
pub struct PersonaModulator {
    rng: Mutex<StdRng>,
}

impl PersonaModulator {
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

    /// Resolve the style for a turn. Deterministic: preset by mood, then
    /// the late-night overlay (22:00-06:00 drops high energy to low and
    /// forces casual slang), then the depth overlay (past 10 turns the
    /// persona loosens up by one playfulness step). A "text_only"
    /// delivery preference on the profile disables voice replies.
    pub fn modulate(
        &self,
        mood: Mood,
        hour: u8,
        turn_count: usize,
        profile: &UserProfile,
    ) -> StyleConfig {
        let mut style = StyleConfig::for_mood(mood);

        if is_late_night(hour) {
            if style.energy == Energy::High {
                style.energy = Energy::Low;
            }
            style.slang_level = SlangLevel::Casual;
        }

        if turn_count > DEEP_CONVERSATION_TURNS {
            style.playfulness = style.playfulness.step_up();
        }

        if profile.mood_preference.as_deref() == Some("text_only") {
            style.include_voice = false;
        }

        style
    }

    /// `modulate` plus the trend adjustment: a sliding mood raises
    /// supportiveness one step.
    pub fn modulate_with_trend(
        &self,
        mood: Mood,
        hour: u8,
        turn_count: usize,
        profile: &UserProfile,
        trend: MoodTrend,
    ) -> StyleConfig {
        let mut style = self.modulate(mood, hour, turn_count, profile);
        if trend == MoodTrend::Negative {
            style.supportiveness = style.supportiveness.raise();
        }
        style
    }

    /// With probability 0.5, attach a mood-matched marker to the reply,
    /// prepended or appended with equal chance.
    pub fn add_markers(&self, text: &str, mood: Mood) -> String {
        let mut rng = self.rng.lock();
        if !rng.gen_bool(0.5) {
            return text.to_string();
        }

        let markers = markers_for(mood);
        let marker = markers[rng.gen_range(0..markers.len())];
        if rng.gen_bool(0.5) {
            format!("{} {}", marker, text)
        } else {
            format!("{} {}", text, marker)
        }
    }

    /// A time-appropriate greeting with the user's name filled in.
    pub fn greeting(&self, name: &str, hour: u8) -> String {
        let pool = match time_of_day(hour) {
            "morning" => MORNING_GREETINGS,
            "afternoon" => AFTERNOON_GREETINGS,
            "evening" => EVENING_GREETINGS,
            _ => NIGHT_GREETINGS,
        };
        let mut rng = self.rng.lock();
        let template = pool[rng.gen_range(0..pool.len())];
        template.replace("{name}", name)
    }
}

impl Default for PersonaModulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile::new("u1", "Asha")
    }

    #[test]
    fn test_stressed_preset() {
        let style = StyleConfig::for_mood(Mood::Stressed);
        assert_eq!(style.energy, Energy::Calm);
        assert_eq!(style.supportiveness, Supportiveness::VeryHigh);
        assert!(style.include_voice);
    }

    #[test]
    fn test_every_mood_has_a_preset() {
        for mood in Mood::all() {
            let style = StyleConfig::for_mood(*mood);
            assert!(style.include_voice);
        }
    }

    #[test]
    fn test_late_night_overlay() {
        let modulator = PersonaModulator::with_seed(1);
        // Happy maps to high energy; at 23:00 it drops to low.
        let style = modulator.modulate(Mood::Happy, 23, 2, &profile());
        assert_eq!(style.energy, Energy::Low);
        assert_eq!(style.slang_level, SlangLevel::Casual);

        // VeryHigh energy is untouched, only slang changes.
        let style = modulator.modulate(Mood::Excited, 2, 2, &profile());
        assert_eq!(style.energy, Energy::VeryHigh);
        assert_eq!(style.slang_level, SlangLevel::Casual);
    }

    #[test]
    fn test_daytime_keeps_preset() {
        let modulator = PersonaModulator::with_seed(1);
        let style = modulator.modulate(Mood::Happy, 14, 2, &profile());
        assert_eq!(style.energy, Energy::High);
        assert_eq!(style.slang_level, SlangLevel::Moderate);
    }

    #[test]
    fn test_depth_overlay_raises_playfulness() {
        let modulator = PersonaModulator::with_seed(1);
        let shallow = modulator.modulate(Mood::Neutral, 14, 5, &profile());
        let deep = modulator.modulate(Mood::Neutral, 14, 11, &profile());
        assert_eq!(shallow.playfulness, Playfulness::Moderate);
        assert_eq!(deep.playfulness, Playfulness::High);
    }

    #[test]
    fn test_playfulness_none_stays_muted() {
        assert_eq!(Playfulness::None.step_up(), Playfulness::None);
        assert_eq!(Playfulness::Maximum.step_up(), Playfulness::Maximum);
    }

    #[test]
    fn test_text_only_preference_disables_voice() {
        let modulator = PersonaModulator::with_seed(1);
        let mut p = profile();
        p.mood_preference = Some("text_only".to_string());
        let style = modulator.modulate(Mood::Happy, 14, 2, &p);
        assert!(!style.include_voice);
    }

    #[test]
    fn test_negative_trend_raises_supportiveness() {
        let modulator = PersonaModulator::with_seed(1);
        let style = modulator.modulate_with_trend(
            Mood::Neutral,
            14,
            2,
            &profile(),
            MoodTrend::Negative,
        );
        assert_eq!(style.supportiveness, Supportiveness::High);

        let style =
            modulator.modulate_with_trend(Mood::Neutral, 14, 2, &profile(), MoodTrend::Positive);
        assert_eq!(style.supportiveness, Supportiveness::Balanced);
    }

    #[test]
    fn test_marker_attaches_at_one_end() {
        let modulator = PersonaModulator::with_seed(3);
        let text = "chai is the answer";
        let mut changed = 0;
        for _ in 0..100 {
            let out = modulator.add_markers(text, Mood::Happy);
            assert!(out.contains(text));
            if out != text {
                changed += 1;
                assert!(out.starts_with(text) || out.ends_with(text));
            }
        }
        // Half the replies should pick up a marker, give or take.
        assert!(changed > 25 && changed < 75, "changed {} of 100", changed);
    }

    #[test]
    fn test_greeting_uses_name_and_slot() {
        let modulator = PersonaModulator::with_seed(5);
        let g = modulator.greeting("Asha", 8);
        assert!(g.contains("Asha"));
        assert!(MORNING_GREETINGS.iter().any(|t| t.replace("{name}", "Asha") == g));

        let g = modulator.greeting("Asha", 23);
        assert!(NIGHT_GREETINGS.iter().any(|t| t.replace("{name}", "Asha") == g));
    }

    #[test]
    fn test_time_of_day_slots() {
        assert_eq!(time_of_day(5), "morning");
        assert_eq!(time_of_day(11), "morning");
        assert_eq!(time_of_day(12), "afternoon");
        assert_eq!(time_of_day(16), "afternoon");
        assert_eq!(time_of_day(17), "evening");
        assert_eq!(time_of_day(21), "evening");
        assert_eq!(time_of_day(22), "night");
        assert_eq!(time_of_day(4), "night");
    }

    #[test]
    fn test_style_serialization() {
        let style = StyleConfig::for_mood(Mood::Excited);
        let json = serde_json::to_value(style).unwrap();
        assert_eq!(json["energy"], "very_high");
        assert_eq!(json["slang_level"], "heavy");

        let lines = style.render_lines();
        assert!(lines.contains("energy: very_high"));
        assert!(lines.contains("playfulness: maximum"));
    }
}
