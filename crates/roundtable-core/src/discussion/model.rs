//! Discussion domain model.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::turn::Turn;
use crate::error::{Result, RoundtableError};
use crate::participant::Participant;

/// Largest roster a discussion accepts.
pub const MAX_ROSTER_SIZE: usize = 4;

/// Conversation style of a discussion.
///
/// `Opinion` runs the role pipeline; every other mode runs
/// intro, round robin, then free debate, and only changes the framing of
/// the free-debate instruction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DiscussionMode {
    #[default]
    Chat,
    Debate,
    Brainstorm,
    Interview,
    Opinion,
}

impl DiscussionMode {
    pub fn is_opinion(&self) -> bool {
        matches!(self, DiscussionMode::Opinion)
    }
}

/// A persisted discussion: roster, topic and the turns said so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub mode: DiscussionMode,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 time of the last change
    pub updated_at: String,
    pub roster: Vec<Participant>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Discussion {
    /// Title used when the creator does not pick one.
    pub fn default_title(roster: &[Participant]) -> String {
        match roster.first() {
            Some(first) => format!("{} & Friends", first.name),
            None => "Roundtable".to_string(),
        }
    }
}

/// Input for starting a new discussion.
#[derive(Debug, Clone)]
pub struct CreateDiscussionRequest {
    pub title: Option<String>,
    pub topic: String,
    pub mode: DiscussionMode,
    pub roster: Vec<Participant>,
}

impl CreateDiscussionRequest {
    /// Checks the request and builds an empty discussion from it.
    pub fn into_discussion(self) -> Result<Discussion> {
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            return Err(RoundtableError::validation("Topic must not be empty"));
        }
        if self.roster.is_empty() || self.roster.len() > MAX_ROSTER_SIZE {
            return Err(RoundtableError::validation(format!(
                "A discussion needs between 1 and {} participants, got {}",
                MAX_ROSTER_SIZE,
                self.roster.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.roster.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(RoundtableError::validation(format!(
                "Participant '{}' is seated twice",
                dup.id
            )));
        }

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| Discussion::default_title(&self.roster));
        let now = Utc::now().to_rfc3339();

        Ok(Discussion {
            id: Uuid::new_v4().to_string(),
            title,
            topic,
            mode: self.mode,
            created_at: now.clone(),
            updated_at: now,
            roster: self.roster,
            turns: Vec::new(),
        })
    }
}
