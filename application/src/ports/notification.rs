//! Notification dispatcher port
//!
//! Every state transition may produce side effects: a system comment on the
//! activity thread, an e-mail, or a deferred push reminder. The engine hands
//! them to a [`NotificationDispatcher`] after the transition is committed.
//! Dispatch is fire-and-forget: a failure is logged by the caller and never
//! rolls anything back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rally_domain::{ActivityId, CommentTarget, Email, Identity, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a dispatcher may report.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which e-mail template a message uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Invitation,
    Accepted,
    Finalized,
    Rescheduled,
    Completed,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::Invitation => "invitation",
            EmailKind::Accepted => "accepted",
            EmailKind::Finalized => "finalized",
            EmailKind::Rescheduled => "rescheduled",
            EmailKind::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EmailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-effect channel for comments, e-mail and push reminders.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Post a system comment on an activity or option thread.
    async fn post_comment(
        &self,
        target: &CommentTarget,
        author: &Identity,
        text: &str,
    ) -> Result<(), NotificationError>;

    /// Send a templated e-mail. `payload` carries the template fields.
    async fn send_email(
        &self,
        kind: EmailKind,
        to: &Email,
        payload: serde_json::Value,
    ) -> Result<(), NotificationError>;

    /// Schedule a push notification for a registered user.
    ///
    /// `activity` groups reminders so they can be cancelled together.
    async fn schedule_push(
        &self,
        activity: &ActivityId,
        user: &UserId,
        title: &str,
        body: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<(), NotificationError>;

    /// Cancel every pending reminder of an activity.
    async fn cancel_reminders(&self, activity: &ActivityId) -> Result<(), NotificationError>;
}
