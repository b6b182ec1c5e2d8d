//! Configuration issues.
//!
//! Loaders collect every problem they find instead of stopping at the first,
//! then decide what to do based on [`Severity`].

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `engine.commit_attempts` is zero, so no write could ever succeed.
    ZeroCommitAttempts,
    /// An hour-of-day field is outside 0-23.
    InvalidHour { field: String, value: u32 },
    /// A reminder offset of zero minutes.
    ZeroOffset,
    /// The same reminder offset listed more than once.
    DuplicateOffset(u32),
    /// A string field that must name one of a fixed set of values.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
