//! Memory importance scoring.

use niyati_core::{MemoryKind, MoodIntensity};

/// Base importance per memory kind.
pub fn base_importance(kind: MemoryKind) -> u8 {
    match kind {
        MemoryKind::Special => 8,
        MemoryKind::Emotional => 7,
        MemoryKind::Preference => 5,
        MemoryKind::Routine => 3,
        MemoryKind::Casual => 2,
    }
}

/// Importance on a 1..=10 scale: the kind's base plus an emotional
/// bonus of floor(intensity level / 3) when the content carried one.
pub fn score(kind: MemoryKind, intensity: Option<MoodIntensity>) -> u8 {
    let base = base_importance(kind);
    let bonus = intensity.map(|i| i.level() / 3).unwrap_or(0);
    (base + bonus).min(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_ordering() {
        assert!(base_importance(MemoryKind::Special) > base_importance(MemoryKind::Emotional));
        assert!(base_importance(MemoryKind::Emotional) > base_importance(MemoryKind::Preference));
        assert!(base_importance(MemoryKind::Preference) > base_importance(MemoryKind::Routine));
        assert!(base_importance(MemoryKind::Routine) > base_importance(MemoryKind::Casual));
    }

    #[test]
    fn test_intensity_bonus() {
        assert_eq!(score(MemoryKind::Casual, None), 2);
        assert_eq!(score(MemoryKind::Casual, Some(MoodIntensity::Low)), 2);
        assert_eq!(score(MemoryKind::Preference, Some(MoodIntensity::Medium)), 6);
        assert_eq!(score(MemoryKind::Emotional, Some(MoodIntensity::High)), 10);
    }

    #[test]
    fn test_score_is_capped_at_ten() {
        assert_eq!(score(MemoryKind::Special, Some(MoodIntensity::High)), 10);
        for kind in [
            MemoryKind::Special,
            MemoryKind::Emotional,
            MemoryKind::Preference,
            MemoryKind::Routine,
            MemoryKind::Casual,
        ] {
            for intensity in [MoodIntensity::Low, MoodIntensity::Medium, MoodIntensity::High] {
                let s = score(kind, Some(intensity));
                assert!((1..=10).contains(&s));
            }
        }
    }
}
