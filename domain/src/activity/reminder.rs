//! Reminder trigger planning.
//!
//! The engine never runs reminders itself. Finalizing or rescheduling an
//! activity produces a list of [`ReminderTrigger`]s, and an external job
//! runner fires them at the given wall-clock times.

use crate::config::{ConfigIssue, ConfigIssueCode, Severity};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// When to remind participants relative to the scheduled time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    /// Minutes before the start, e.g. `[60, 30]`.
    pub offsets_minutes: Vec<u32>,
    /// Hour of a day-of morning reminder (UTC), if any.
    pub day_of_hour: Option<u32>,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            offsets_minutes: vec![60, 30],
            day_of_hour: Some(9),
        }
    }
}

/// A single deferred reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTrigger {
    pub fire_at: DateTime<Utc>,
    pub label: String,
}

impl ReminderPolicy {
    /// A policy that never schedules anything.
    pub fn disabled() -> Self {
        Self {
            offsets_minutes: Vec::new(),
            day_of_hour: None,
        }
    }

    /// Trigger points for an activity starting at `scheduled_at`.
    ///
    /// Triggers already in the past relative to `now`, and a day-of reminder
    /// that would fire at or after the start, are dropped. The result is
    /// sorted by fire time with duplicates removed.
    pub fn plan(&self, scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Vec<ReminderTrigger> {
        let mut triggers: Vec<ReminderTrigger> = self
            .offsets_minutes
            .iter()
            .filter(|m| **m > 0)
            .map(|m| ReminderTrigger {
                fire_at: scheduled_at - Duration::minutes(i64::from(*m)),
                label: format!("starts in {} minutes", m),
            })
            .collect();

        if let Some(hour) = self.day_of_hour
            && let Some(morning) = NaiveTime::from_hms_opt(hour, 0, 0)
        {
            let fire_at = scheduled_at.date_naive().and_time(morning).and_utc();
            if fire_at < scheduled_at {
                triggers.push(ReminderTrigger {
                    fire_at,
                    label: "happening today".to_string(),
                });
            }
        }

        triggers.retain(|t| t.fire_at > now);
        triggers.sort_by_key(|t| t.fire_at);
        triggers.dedup_by_key(|t| t.fire_at);
        triggers
    }

    /// Check the policy for values that can never fire.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(hour) = self.day_of_hour
            && hour > 23
        {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::InvalidHour {
                    field: "reminders.day_of_hour".to_string(),
                    value: hour,
                },
                message: format!("reminders.day_of_hour must be 0-23, got {}", hour),
            });
        }

        if self.offsets_minutes.contains(&0) {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ZeroOffset,
                message: "reminders.offsets_minutes contains 0, which is ignored".to_string(),
            });
        }

        let mut seen = Vec::new();
        for offset in &self.offsets_minutes {
            if seen.contains(offset) {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::DuplicateOffset(*offset),
                    message: format!("reminders.offsets_minutes lists {} twice", offset),
                });
            } else {
                seen.push(*offset);
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_default_plan() {
        let triggers = ReminderPolicy::default().plan(at(18, 0), at(6, 0));
        let times: Vec<_> = triggers.iter().map(|t| t.fire_at).collect();
        assert_eq!(times, vec![at(9, 0), at(17, 0), at(17, 30)]);
    }

    #[test]
    fn test_past_triggers_are_dropped() {
        let triggers = ReminderPolicy::default().plan(at(18, 0), at(17, 10));
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].fire_at, at(17, 30));
    }

    #[test]
    fn test_morning_reminder_skipped_for_early_start() {
        let triggers = ReminderPolicy::default().plan(at(8, 0), at(0, 0));
        assert!(triggers.iter().all(|t| t.label != "happening today"));
    }

    #[test]
    fn test_disabled_policy() {
        assert!(ReminderPolicy::disabled().plan(at(18, 0), at(0, 0)).is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(ReminderPolicy::default().validate().is_empty());

        let policy = ReminderPolicy {
            offsets_minutes: vec![30, 30, 0],
            day_of_hour: Some(24),
        };
        let issues = policy.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.severity == Severity::Error));
    }
}
