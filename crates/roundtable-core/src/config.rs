//! Application configuration model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RoundtableConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Timing of the scheduler loop.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay before the first tick after `start`
    pub start_delay_ms: u64,
    /// Delay between autonomous turns
    pub turn_interval_ms: u64,
    /// Delay before resuming after a user message
    pub user_settle_ms: u64,
    /// Delay before resuming after a reset
    pub reset_settle_ms: u64,
    /// Upper bound on one model call
    pub generation_timeout_secs: u64,
    /// Number of recent turns sent to a model
    pub context_window: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 1000,
            turn_interval_ms: 1500,
            user_settle_ms: 800,
            reset_settle_ms: 1000,
            generation_timeout_secs: 45,
            context_window: 15,
        }
    }
}

impl SchedulerConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn turn_interval(&self) -> Duration {
        Duration::from_millis(self.turn_interval_ms)
    }

    pub fn user_settle(&self) -> Duration {
        Duration::from_millis(self.user_settle_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Label for the local user in transcripts
    pub user_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            user_name: "You".to_string(),
        }
    }
}
