//! Role labels and the instruction text each one hands to a generative speaker.
//!
//! The instructions are a fixed table of templates rendered with the
//! discussion topic and the speaker's character description.

use minijinja::{Environment, context};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::discussion::DiscussionMode;

/// The framing a speaker receives for one turn, independent of who they are.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoleLabel {
    /// First statement during the round robin
    Opening,
    /// Free debate; also used for every mention answer
    Debate,
    Pioneer,
    Rationalist,
    Realist,
    Converger,
    /// One-sentence closing statement
    Statement,
}

/// Appended to every system instruction.
pub const OUTPUT_FORMAT_RULES: &str = "Reply in plain text only. Do not start with your own name or any speaker label. Do not use markdown, lists, or stage directions. Keep it under 80 words.";

const TEMPLATES: &[(&str, &str)] = &[
    (
        "host",
        "Welcome to the roundtable. Today's topic: \"{{ topic }}\". {% if opinion %}Each guest will take a role in turn.{% else %}Let's hear from everyone.{% endif %}",
    ),
    (
        "opening",
        "Give your opening view on \"{{ topic }}\" in two or three sentences.{{ persona }}",
    ),
    (
        "debate.chat",
        "This is a relaxed conversation about \"{{ topic }}\". React to the most recent message, agree or push back, and keep it conversational.{{ persona }}",
    ),
    (
        "debate.debate",
        "This is a debate about \"{{ topic }}\". Challenge the weakest point made by the previous speaker and defend your own position.{{ persona }}",
    ),
    (
        "debate.brainstorm",
        "This is a brainstorm about \"{{ topic }}\". Build on an idea already raised and add one new, concrete idea.{{ persona }}",
    ),
    (
        "debate.interview",
        "This is an interview about \"{{ topic }}\". Either answer the last question directly or ask one sharp follow-up question.{{ persona }}",
    ),
    (
        "debate.opinion",
        "You were addressed directly in a discussion about \"{{ topic }}\". Answer the person who addressed you, briefly and in character.{{ persona }}",
    ),
    (
        "pioneer",
        "You are the Pioneer on \"{{ topic }}\". Make one bold, tension-creating claim that others will have to respond to.{{ persona }}",
    ),
    (
        "rationalist",
        "You are the Rationalist on \"{{ topic }}\". Expose the uncertainty or the gap in logic behind the claims made so far.{{ persona }}",
    ),
    (
        "realist",
        "You are the Realist on \"{{ topic }}\". Ground the discussion in practical cost, constraints and who actually pays.{{ persona }}",
    ),
    (
        "converger",
        "You are the Converger on \"{{ topic }}\". Name the axis the group disagrees on. Do not resolve it.{{ persona }}",
    ),
    (
        "statement",
        "Give your closing statement on \"{{ topic }}\" as one memorable sentence.{{ persona }}",
    ),
];

static TEMPLATE_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Invalid role template '{}': {}", name, e);
        }
    }
    env
});

fn render(name: &str, topic: &str, description: Option<&str>, opinion: bool) -> String {
    let persona = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| format!(" Stay in character: {}", d))
        .unwrap_or_default();

    let rendered = TEMPLATE_ENV.get_template(name).and_then(|t| {
        t.render(context! {
            topic => topic,
            persona => persona,
            opinion => opinion,
        })
    });

    match rendered {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to render role template '{}': {}", name, e);
            format!("Share your view on \"{}\".{}", topic, persona)
        }
    }
}

impl RoleLabel {
    /// The framing text for this role.
    ///
    /// `Debate` depends on the discussion mode; the other labels do not.
    pub fn instruction(&self, mode: DiscussionMode, topic: &str, description: Option<&str>) -> String {
        let name = match self {
            RoleLabel::Opening => "opening",
            RoleLabel::Debate => match mode {
                DiscussionMode::Chat => "debate.chat",
                DiscussionMode::Debate => "debate.debate",
                DiscussionMode::Brainstorm => "debate.brainstorm",
                DiscussionMode::Interview => "debate.interview",
                DiscussionMode::Opinion => "debate.opinion",
            },
            RoleLabel::Pioneer => "pioneer",
            RoleLabel::Rationalist => "rationalist",
            RoleLabel::Realist => "realist",
            RoleLabel::Converger => "converger",
            RoleLabel::Statement => "statement",
        };
        render(name, topic, description, mode.is_opinion())
    }
}

/// The host's line that opens (and re-opens after a reset) a discussion.
pub fn host_opening_line(mode: DiscussionMode, topic: &str) -> String {
    render("host", topic, None, mode.is_opinion())
}
