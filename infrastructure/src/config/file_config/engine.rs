//! Engine and reminder configuration from TOML (`[engine]`, `[reminders]`)

use rally_domain::ReminderPolicy;
use serde::{Deserialize, Serialize};

/// Raw `[engine]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Attempts per mutation before a version conflict is reported
    pub commit_attempts: u32,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self { commit_attempts: 3 }
    }
}

/// Raw `[reminders]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRemindersConfig {
    pub enabled: bool,
    /// Minutes before the start
    pub offsets_minutes: Vec<u32>,
    /// Hour (UTC) of the day-of reminder; omit to disable it
    pub day_of_hour: Option<u32>,
}

impl Default for FileRemindersConfig {
    fn default() -> Self {
        let policy = ReminderPolicy::default();
        Self {
            enabled: true,
            offsets_minutes: policy.offsets_minutes,
            day_of_hour: policy.day_of_hour,
        }
    }
}

impl FileRemindersConfig {
    pub fn to_policy(&self) -> ReminderPolicy {
        if !self.enabled {
            return ReminderPolicy::disabled();
        }
        ReminderPolicy {
            offsets_minutes: self.offsets_minutes.clone(),
            day_of_hour: self.day_of_hour,
        }
    }
}
