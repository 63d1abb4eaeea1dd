//! Terminal rendering of turns and runtime events.

use colored::{ColoredString, Colorize};
use roundtable_application::RuntimeStatus;
use roundtable_core::discussion::{RoundtableEvent, SentinelKind, Speaker, Turn};
use roundtable_core::participant::Participant;

/// Maps a participant's accent colour onto the terminal palette.
fn accent(name: &str, color: &str) -> ColoredString {
    match color {
        "emerald" | "green" => name.bright_green(),
        "sky" | "blue" => name.bright_cyan(),
        "rose" | "red" => name.bright_red(),
        "amber" | "yellow" => name.bright_yellow(),
        "violet" | "purple" => name.bright_magenta(),
        _ => name.bright_blue(),
    }
    .bold()
}

pub fn turn(turn: &Turn, roster: &[Participant], user_name: &str) -> String {
    let name = turn.speaker.display_name(user_name);
    let label = match &turn.speaker {
        Speaker::Participant { id, .. } => {
            let color = roster
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.color.as_str())
                .unwrap_or_default();
            accent(name, color)
        }
        Speaker::Sentinel { kind } => match kind {
            SentinelKind::User => name.green().bold(),
            SentinelKind::Host => name.magenta().bold(),
            SentinelKind::System => name.bright_black().bold(),
        },
    };

    let text = if turn.failed {
        turn.text.red()
    } else if turn.speaker.is_system() {
        turn.text.bright_black()
    } else {
        turn.text.normal()
    };

    match turn.role {
        Some(role) if !turn.sidebar && turn.speaker.participant_id().is_some() => {
            format!("{} {} {}", label, format!("({})", role).bright_black(), text)
        }
        _ => format!("{} {}", label, text),
    }
}

/// One line for an event, or `None` for events the REPL does not show.
pub fn event(event: &RoundtableEvent, roster: &[Participant], user_name: &str) -> Option<String> {
    match event {
        // the REPL echoes the user's own lines
        RoundtableEvent::TurnAppended { turn: t } if t.speaker.is_user() => None,
        RoundtableEvent::TurnAppended { turn: t } => Some(turn(t, roster, user_name)),
        RoundtableEvent::PhaseChanged { change } => {
            Some(format!("--- {} ---", change.to).bright_black().to_string())
        }
        RoundtableEvent::ThinkingStarted {
            participant_name, ..
        } => Some(format!("{} is thinking...", participant_name).bright_black().italic().to_string()),
        RoundtableEvent::ThinkingFinished { .. } => None,
        RoundtableEvent::DiscussionReset { .. } => {
            Some("The table has been reset.".yellow().to_string())
        }
        RoundtableEvent::Halted { phase } => Some(
            format!(
                "The discussion rests at '{}'. Mention someone with @Name, or /reset to begin again.",
                phase
            )
            .yellow()
            .to_string(),
        ),
    }
}

pub fn status(status: &RuntimeStatus) -> String {
    format!(
        "phase: {}  running: {}  thinking: {}  turns: {}  resets: {}",
        status.phase.to_string().bright_cyan(),
        status.running,
        status.busy,
        status.turn_count,
        status.epoch
    )
}
