//! Clean-up applied to every model reply.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think>.*?</think>|&lt;think&gt;.*?&lt;/think&gt;")
        .expect("THINK_BLOCK regex should compile")
});

/// Removes reasoning blocks, surrounding whitespace and a leading
/// `Name:` label the model may have added for itself.
pub fn sanitize_reply(raw: &str, speaker_name: &str) -> String {
    let without_thinking = THINK_BLOCK.replace_all(raw, "");
    let text = without_thinking.trim();
    strip_name_prefix(text, speaker_name).trim().to_string()
}

fn strip_name_prefix<'a>(text: &'a str, name: &str) -> &'a str {
    let name = name.trim();
    if name.is_empty() {
        return text;
    }
    let Some(head) = text.get(..name.len()) else {
        return text;
    };
    if !head.eq_ignore_ascii_case(name) {
        return text;
    }
    let rest = &text[name.len()..];
    rest.strip_prefix(':')
        .or_else(|| rest.strip_prefix('：'))
        .unwrap_or(text)
}
