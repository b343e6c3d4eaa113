//! Prompt assembly.
//!
//! Pure string work: the assembler takes everything it needs as input
//! and renders the persona template. No clock reads, no randomness, no
//! I/O, so identical inputs always produce identical prompts.

use niyati_core::{BufferEntry, Language, MoodReading, TurnRole};

use crate::style::{time_of_day, StyleConfig};

/// Literal rendered when the user has no stored memories yet.
pub const MEMORY_FALLBACK: &str = "No special memories yet, still getting to know them!";

/// Most history lines rendered into the prompt (3 exchanges).
const MAX_HISTORY_LINES: usize = 6;

const TEMPLATE: &str = include_str!("../resources/persona_prompt.txt");

/// Everything a single prompt is built from.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub user_text: &'a str,
    pub user_name: &'a str,
    pub mood: MoodReading,
    pub language: Language,
    pub hour: u8,
    pub turn_count: usize,
    /// Recent buffer entries, oldest first.
    pub recent: &'a [BufferEntry],
    /// Relevant memory snippets, already stringified.
    pub memories: &'a [String],
    pub style: StyleConfig,
}

/// Renders the persona template for each turn.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, ctx: &PromptContext<'_>) -> String {
        TEMPLATE
            .replace("{context}", &render_context(ctx))
            .replace("{style}", &ctx.style.render_lines())
            .replace("{history}", &render_history(ctx.recent))
            .replace("{memories}", &render_memories(ctx.memories))
            .replace("{guidance}", guidance_for(ctx))
            .replace("{message}", ctx.user_text)
    }
}

fn render_context(ctx: &PromptContext<'_>) -> String {
    format!(
        "Time of day: {}\nTalking to: {}\nTheir mood right now: {} ({})\nLanguage to use: {}\nConversation depth: {}",
        time_of_day(ctx.hour),
        ctx.user_name,
        ctx.mood.mood.as_str(),
        ctx.mood.intensity.as_str(),
        ctx.language.as_str(),
        depth_label(ctx.turn_count),
    )
}

fn depth_label(turn_count: usize) -> &'static str {
    if turn_count <= 2 {
        "just started talking"
    } else if turn_count <= 10 {
        "warming up"
    } else {
        "deep in conversation"
    }
}

fn render_history(recent: &[BufferEntry]) -> String {
    if recent.is_empty() {
        return "(nothing yet, this is the start)".to_string();
    }

    let start = recent.len().saturating_sub(MAX_HISTORY_LINES);
    recent[start..]
        .iter()
        .map(|entry| match entry.role {
            TurnRole::User => format!("User: {}", entry.content),
            TurnRole::Assistant => format!("Niyati: {}", entry.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_memories(memories: &[String]) -> String {
    if memories.is_empty() {
        return MEMORY_FALLBACK.to_string();
    }

    memories
        .iter()
        .take(3)
        .map(|m| format!("- {}", m))
        .collect::<Vec<_>>()
        .join("\n")
}

fn guidance_for(ctx: &PromptContext<'_>) -> &'static str {
    use niyati_core::Mood;
    match ctx.mood.mood {
        Mood::Happy => "Match their energy! Be hyped with them and keep things fun.",
        Mood::Sad => "Be soft and caring. Let them vent, don't rush to fix things.",
        Mood::Stressed => {
            "Stay calm and grounding. Remind them it's manageable, one thing at a time."
        }
        Mood::Angry => "Let them rant. Take their side first, don't lecture.",
        Mood::Anxious => "Reassure them gently. Keep replies short and steady.",
        Mood::Excited => "Get excited with them!! Ask for all the details.",
        Mood::Bored => "Bring the fun. Tease them a little, suggest something random.",
        Mood::Romantic => "Be playful and a little shy about it. Gentle teasing is fine.",
        Mood::Tired => "Keep it low-key and cozy. Short replies, no big questions.",
        Mood::Neutral => "Just chat naturally, like always.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use niyati_core::{Mood, MoodIntensity};

    fn ctx<'a>(recent: &'a [BufferEntry], memories: &'a [String]) -> PromptContext<'a> {
        PromptContext {
            user_text: "kya kar rahi ho",
            user_name: "Asha",
            mood: MoodReading::new(Mood::Happy, MoodIntensity::Medium),
            language: Language::Hinglish,
            hour: 14,
            turn_count: 4,
            recent,
            memories,
            style: StyleConfig::for_mood(Mood::Happy),
        }
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let assembler = PromptAssembler::new();
        let recent = vec![BufferEntry::user("hi")];
        let memories = vec!["loves filter coffee".to_string()];
        let a = assembler.assemble(&ctx(&recent, &memories));
        let b = assembler.assemble(&ctx(&recent, &memories));
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_sections_appear_in_order() {
        let assembler = PromptAssembler::new();
        let recent = vec![
            BufferEntry::user("hi"),
            BufferEntry::assistant("heyy"),
        ];
        let memories = vec!["has exams in june".to_string()];
        let prompt = assembler.assemble(&ctx(&recent, &memories));

        let identity = prompt.find("You are Niyati").unwrap();
        let context = prompt.find("Time of day: afternoon").unwrap();
        let style = prompt.find("energy: high").unwrap();
        let history = prompt.find("User: hi").unwrap();
        let memory = prompt.find("- has exams in june").unwrap();
        let guidance = prompt.find("Match their energy!").unwrap();
        let message = prompt.find("kya kar rahi ho").unwrap();
        let checklist = prompt.find("Never break character").unwrap();

        assert!(identity < context);
        assert!(context < style);
        assert!(style < history);
        assert!(history < memory);
        assert!(memory < guidance);
        assert!(guidance < message);
        assert!(message < checklist);
    }

    #[test]
    fn test_empty_memories_renders_fallback_literal() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.assemble(&ctx(&[], &[]));
        assert!(prompt.contains(MEMORY_FALLBACK));
    }

    #[test]
    fn test_memories_cap_at_three_bullets() {
        let assembler = PromptAssembler::new();
        let memories: Vec<String> = (0..5).map(|i| format!("memory {}", i)).collect();
        let prompt = assembler.assemble(&ctx(&[], &memories));
        assert!(prompt.contains("- memory 0"));
        assert!(prompt.contains("- memory 2"));
        assert!(!prompt.contains("- memory 3"));
    }

    #[test]
    fn test_history_caps_at_three_exchanges() {
        let assembler = PromptAssembler::new();
        let mut recent = Vec::new();
        for i in 0..5 {
            recent.push(BufferEntry::user(format!("question {}", i)));
            recent.push(BufferEntry::assistant(format!("answer {}", i)));
        }
        let prompt = assembler.assemble(&ctx(&recent, &[]));
        assert!(!prompt.contains("question 1"));
        assert!(prompt.contains("question 2"));
        assert!(prompt.contains("answer 4"));
    }

    #[test]
    fn test_empty_history_has_placeholder() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.assemble(&ctx(&[], &[]));
        assert!(prompt.contains("(nothing yet, this is the start)"));
    }

    #[test]
    fn test_depth_labels() {
        assert_eq!(depth_label(0), "just started talking");
        assert_eq!(depth_label(2), "just started talking");
        assert_eq!(depth_label(3), "warming up");
        assert_eq!(depth_label(10), "warming up");
        assert_eq!(depth_label(11), "deep in conversation");
    }
}
