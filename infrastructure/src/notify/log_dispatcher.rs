//! Dispatcher that only logs.
//!
//! Used when no outbox is configured, so notifications still show up with
//! `-v`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rally_application::{EmailKind, NotificationDispatcher, NotificationError};
use rally_domain::{ActivityId, CommentTarget, Email, Identity, UserId};
use tracing::info;

pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn post_comment(
        &self,
        target: &CommentTarget,
        author: &Identity,
        text: &str,
    ) -> Result<(), NotificationError> {
        info!("comment on {} by {}: {}", target, author, text);
        Ok(())
    }

    async fn send_email(
        &self,
        kind: EmailKind,
        to: &Email,
        _payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        info!("{} e-mail to {}", kind, to);
        Ok(())
    }

    async fn schedule_push(
        &self,
        activity: &ActivityId,
        user: &UserId,
        title: &str,
        _body: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        info!(
            "push '{}' for {} on {} at {}",
            title, user, activity, fire_at
        );
        Ok(())
    }

    async fn cancel_reminders(&self, activity: &ActivityId) -> Result<(), NotificationError> {
        info!("reminders for {} cancelled", activity);
        Ok(())
    }
}
