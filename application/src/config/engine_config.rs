//! Engine configuration: knobs the use cases read at runtime.

use rally_domain::{ConfigIssue, ConfigIssueCode, ReminderPolicy, Severity};
use serde::{Deserialize, Serialize};

/// Runtime parameters shared by every use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many times a mutation is re-applied after losing a version race.
    pub commit_attempts: u32,
    /// Reminder triggers scheduled on finalize and reschedule.
    pub reminders: ReminderPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_attempts: 3,
            reminders: ReminderPolicy::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_commit_attempts(mut self, attempts: u32) -> Self {
        self.commit_attempts = attempts;
        self
    }

    pub fn with_reminders(mut self, reminders: ReminderPolicy) -> Self {
        self.reminders = reminders;
        self
    }

    pub fn without_reminders(self) -> Self {
        self.with_reminders(ReminderPolicy::disabled())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.commit_attempts == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::ZeroCommitAttempts,
                message: "engine.commit_attempts must be at least 1".to_string(),
            });
        }
        issues.extend(self.reminders.validate());
        issues
    }
}
