//! Mood-tuned voice delivery settings.

use niyati_core::Mood;
use serde::Serialize;

/// ElevenLabs voice_settings payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

/// Neutral delivery baseline.
pub const BASE_VOICE: VoiceSettings = VoiceSettings {
    stability: 0.7,
    similarity_boost: 0.8,
    style: 0.5,
    use_speaker_boost: true,
};

/// Delivery overrides per mood. Expressive moods trade stability for
/// style; heavy moods (anxious, angry) get the steadier supportive
/// delivery. Anything unlisted speaks with the baseline.
pub fn settings_for(mood: Mood) -> VoiceSettings {
    match mood {
        Mood::Happy => VoiceSettings {
            stability: 0.45,
            similarity_boost: 0.8,
            style: 0.7,
            use_speaker_boost: true,
        },
        Mood::Excited => VoiceSettings {
            stability: 0.35,
            similarity_boost: 0.75,
            style: 0.9,
            use_speaker_boost: true,
        },
        Mood::Sad => VoiceSettings {
            stability: 0.85,
            similarity_boost: 0.85,
            style: 0.25,
            use_speaker_boost: true,
        },
        Mood::Stressed => VoiceSettings {
            stability: 0.8,
            similarity_boost: 0.85,
            style: 0.3,
            use_speaker_boost: true,
        },
        Mood::Anxious | Mood::Angry => VoiceSettings {
            stability: 0.75,
            similarity_boost: 0.85,
            style: 0.35,
            use_speaker_boost: true,
        },
        _ => BASE_VOICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_values() {
        assert_eq!(BASE_VOICE.stability, 0.7);
        assert_eq!(BASE_VOICE.similarity_boost, 0.8);
        assert_eq!(BASE_VOICE.style, 0.5);
        assert!(BASE_VOICE.use_speaker_boost);
    }

    #[test]
    fn test_neutral_moods_use_baseline() {
        assert_eq!(settings_for(Mood::Neutral), BASE_VOICE);
        assert_eq!(settings_for(Mood::Bored), BASE_VOICE);
        assert_eq!(settings_for(Mood::Tired), BASE_VOICE);
        assert_eq!(settings_for(Mood::Romantic), BASE_VOICE);
    }

    #[test]
    fn test_expressive_moods_lower_stability() {
        assert!(settings_for(Mood::Excited).stability < BASE_VOICE.stability);
        assert!(settings_for(Mood::Happy).style > BASE_VOICE.style);
        assert!(settings_for(Mood::Sad).stability > BASE_VOICE.stability);
    }

    #[test]
    fn test_heavy_moods_share_supportive_delivery() {
        assert_eq!(settings_for(Mood::Anxious), settings_for(Mood::Angry));
    }

    #[test]
    fn test_settings_serialization() {
        let json = serde_json::to_string(&BASE_VOICE).unwrap();
        assert!(json.contains("\"stability\":0.7"));
        assert!(json.contains("\"similarity_boost\":0.8"));
        assert!(json.contains("\"use_speaker_boost\":true"));
    }
}
