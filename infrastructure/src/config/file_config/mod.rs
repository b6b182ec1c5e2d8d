//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod engine;
mod output;
mod recommendations;
mod store;

pub use engine::{FileEngineConfig, FileRemindersConfig};
pub use output::FileOutputConfig;
pub use recommendations::{FileRecommendationsConfig, FileRecommendedPlace};
pub use store::{FileOutboxConfig, FileStoreConfig};

use rally_application::EngineConfig;
use rally_domain::{ActivityKind, ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Commit retry settings
    pub engine: FileEngineConfig,
    /// Reminder schedule
    pub reminders: FileRemindersConfig,
    /// State file location
    pub store: FileStoreConfig,
    /// Notification outbox
    pub outbox: FileOutboxConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Static recommendation catalog
    pub recommendations: FileRecommendationsConfig,
}

impl FileConfig {
    /// Build the engine configuration from the raw sections.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_commit_attempts(self.engine.commit_attempts)
            .with_reminders(self.reminders.to_policy())
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Engine settings (commit attempts, reminder policy)
    /// 2. Recommendation catalog entries (empty names, unknown kinds)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.engine_config().validate();

        for (idx, place) in self.recommendations.places.iter().enumerate() {
            if place.name.trim().is_empty() {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: format!("recommendations.places[{}].name", idx),
                        value: String::new(),
                        valid_values: vec![],
                    },
                    message: format!(
                        "recommendations.places[{}] has no name and will be ignored",
                        idx
                    ),
                });
            }
            for kind in &place.kinds {
                if kind.parse::<ActivityKind>().is_err() {
                    issues.push(ConfigIssue {
                        severity: Severity::Warning,
                        code: ConfigIssueCode::InvalidEnumValue {
                            field: format!("recommendations.places[{}].kinds", idx),
                            value: kind.clone(),
                            valid_values: vec![
                                "restaurant".to_string(),
                                "meeting".to_string(),
                                "game-night".to_string(),
                                "cocktails".to_string(),
                            ],
                        },
                        message: format!(
                            "recommendations.places[{}].kinds: unknown kind '{}'",
                            idx, kind
                        ),
                    });
                }
            }
        }

        issues
    }
}
