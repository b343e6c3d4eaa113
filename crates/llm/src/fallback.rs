//! In-character fallback lines for when generation fails.

use niyati_core::Language;

/// A plausible "my phone glitched" reply in the user's language, sent
/// whenever the model times out, errors or returns nothing usable.
pub fn fallback_utterance(language: Language) -> &'static str {
    match language {
        Language::English => "Ugh sorry, my phone is acting up 😅 say that again?",
        Language::Hindi => "Arre yaar, network thoda ajeeb chal raha hai... phir se bolo na?",
        Language::Hinglish => "Uff, phone hang ho gaya tha 😅 kya bol rahe the?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_language_matched() {
        let english = fallback_utterance(Language::English);
        let hindi = fallback_utterance(Language::Hindi);
        let hinglish = fallback_utterance(Language::Hinglish);

        assert!(!english.is_empty());
        assert_ne!(english, hindi);
        assert_ne!(hindi, hinglish);
        assert_ne!(english, hinglish);
    }

    #[test]
    fn test_fallbacks_stay_in_character() {
        for language in Language::all() {
            let line = fallback_utterance(*language).to_lowercase();
            assert!(!line.contains("error"));
            assert!(!line.contains("model"));
            assert!(!line.split_whitespace().any(|w| w == "ai" || w == "bot"));
        }
    }
}
