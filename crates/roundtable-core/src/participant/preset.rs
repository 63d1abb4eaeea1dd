//! Built-in scripted characters.

use super::model::{CharacterSource, Participant, ParticipantKind};

fn character(id: &str, name: &str, tag: &str, color: &str, phrases: &[&str]) -> Participant {
    Participant {
        id: id.to_string(),
        name: name.to_string(),
        avatar: String::new(),
        tag: tag.to_string(),
        color: color.to_string(),
        source: CharacterSource::System,
        kind: ParticipantKind::Scripted {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        },
    }
}

/// Returns the characters that ship with the application.
///
/// All of them are scripted; `{topic}` in a phrase is replaced with the
/// discussion topic when spoken.
pub fn builtin_characters() -> Vec<Participant> {
    vec![
        character(
            "musk",
            "Elon Musk",
            "Tech Visionary",
            "emerald",
            &[
                "First principles thinking tells us that the essence of {topic} is...",
                "Hardcore! We need to discuss {topic} on Mars.",
                "AI is like a nuke, it must be open source! Regarding {topic}...",
                "This is critical for the future of consciousness.",
                "We need to make {topic} multi-planetary.",
                "Exactly. We need to iterate faster.",
                "The pace of innovation is everything.",
                "I think we are too slow here.",
                "Let that sink in.",
            ],
        ),
        character(
            "einstein",
            "Albert Einstein",
            "Physics God",
            "sky",
            &[
                "God does not play dice, but {topic} is indeed full of uncertainty.",
                "Imagination is more important than knowledge. Let me imagine a metaphor about {topic}...",
                "Relativity tells us that there is no absolute answer to {topic}.",
                "We cannot solve our problems with the same thinking we used when we created them.",
                "Time is an illusion, just like our understanding of {topic}.",
                "Everything should be made as simple as possible, but not simpler.",
                "The important thing is not to stop questioning.",
                "Logic will get you from A to B. Imagination will take you everywhere.",
            ],
        ),
        character(
            "luxun",
            "Lu Xun",
            "Soul of the Nation",
            "rose",
            &[
                "Hehe, {topic}? Has it always been like this? And is that right?",
                "I have always suspected {topic} with the worst malice.",
                "There was no road in the world, but when many people discussed {topic}, it became a road.",
                "Save the children... from {topic}!",
                "This is just like an iron house without windows.",
                "Hope cannot be said to exist, nor can it be said not to exist.",
                "Wasting others' time is equal to murder.",
            ],
        ),
        character(
            "kobe",
            "Kobe Bryant",
            "Black Mamba",
            "amber",
            &[
                "4 AM in Los Angeles tells me that {topic} needs Mamba Mentality.",
                "If you are afraid of {topic}, you have already lost.",
                "Job's not finished. Is {topic} finished? I don't think so.",
                "Rest at the end, not in the middle.",
                "Dedication makes dreams come true.",
                "Mamba out.",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_characters_are_unique_scripted_system_entries() {
        let characters = builtin_characters();
        let ids: HashSet<_> = characters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), characters.len());

        for c in &characters {
            assert_eq!(c.source, CharacterSource::System);
            assert!(!c.is_generative());
            assert!(!c.phrases().is_empty(), "{} has no phrases", c.name);
        }
    }
}
