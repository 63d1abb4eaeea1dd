//! Turns and the append-only discussion log.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::participant::Participant;
use crate::role::RoleLabel;

/// Speakers that are not roster members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelKind {
    User,
    System,
    Host,
}

/// Who produced a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Speaker {
    Sentinel { kind: SentinelKind },
    /// A roster member. The name is captured at append time.
    Participant { id: String, name: String },
}

impl Speaker {
    pub fn user() -> Self {
        Speaker::Sentinel {
            kind: SentinelKind::User,
        }
    }

    pub fn system() -> Self {
        Speaker::Sentinel {
            kind: SentinelKind::System,
        }
    }

    pub fn host() -> Self {
        Speaker::Sentinel {
            kind: SentinelKind::Host,
        }
    }

    pub fn participant(participant: &Participant) -> Self {
        Speaker::Participant {
            id: participant.id.clone(),
            name: participant.name.clone(),
        }
    }

    pub fn participant_id(&self) -> Option<&str> {
        match self {
            Speaker::Participant { id, .. } => Some(id),
            Speaker::Sentinel { .. } => None,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(
            self,
            Speaker::Sentinel {
                kind: SentinelKind::User
            }
        )
    }

    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Speaker::Sentinel {
                kind: SentinelKind::System
            }
        )
    }

    /// Name shown in transcripts. `user_name` labels the local user.
    pub fn display_name<'a>(&'a self, user_name: &'a str) -> &'a str {
        match self {
            Speaker::Participant { name, .. } => name,
            Speaker::Sentinel { kind } => match kind {
                SentinelKind::User => user_name,
                SentinelKind::System => "System",
                SentinelKind::Host => "Host",
            },
        }
    }
}

/// One utterance in a discussion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch; strictly increasing within a log
    pub timestamp: i64,
    /// Framing the speaker was given, for autonomous turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleLabel>,
    /// Answer to a mention; does not move the phase machine
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sidebar: bool,
    /// The text is an error notice in place of a reply
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub speaker: Speaker,
}

/// Everything about a turn except the fields the log assigns.
#[derive(Debug, Clone)]
pub struct TurnDraft {
    pub speaker: Speaker,
    pub text: String,
    pub role: Option<RoleLabel>,
    pub sidebar: bool,
    pub failed: bool,
}

impl TurnDraft {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            role: None,
            sidebar: false,
            failed: false,
        }
    }

    pub fn with_role(mut self, role: RoleLabel) -> Self {
        self.role = Some(role);
        self
    }

    pub fn sidebar(mut self, sidebar: bool) -> Self {
        self.sidebar = sidebar;
        self
    }

    pub fn failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }
}

/// Ordered, append-only record of what has been said.
///
/// Turns can only be appended or the whole log cleared; existing entries
/// are never handed out mutably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscussionLog {
    turns: Vec<Turn>,
}

impl DiscussionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps turns loaded from storage.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Appends a turn, assigning its id and a timestamp later than the
    /// current tail's.
    pub fn append(&mut self, draft: TurnDraft) -> &Turn {
        let now = Utc::now().timestamp_millis();
        let timestamp = match self.turns.last() {
            Some(last) if last.timestamp >= now => last.timestamp + 1,
            _ => now,
        };

        let index = self.turns.len();
        self.turns.push(Turn {
            id: Uuid::new_v4().to_string(),
            speaker: draft.speaker,
            text: draft.text,
            timestamp,
            role: draft.role,
            sidebar: draft.sidebar,
            failed: draft.failed,
        });
        &self.turns[index]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The most recent `n` turns, oldest first.
    pub fn tail(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}
