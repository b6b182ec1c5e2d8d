//! Shared utilities for use cases.
//!
//! [`BoardStore`] runs the load → apply → commit loop every mutation goes
//! through, and [`Notifier`] wraps the dispatcher so side-effect failures are
//! logged instead of propagated.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::notification::{EmailKind, NotificationDispatcher};
use futures::future::join_all;
use rally_domain::{
    Activity, ActivityBoard, ActivityId, ActivityRepository, CommentTarget, DomainError, Email,
    Identity, ReminderTrigger, SystemComment, UserDirectory, UserId, Versioned,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Versioned access to activity boards.
pub(crate) struct BoardStore {
    repo: Arc<dyn ActivityRepository>,
    attempts: u32,
}

impl BoardStore {
    pub(crate) fn new(repo: Arc<dyn ActivityRepository>, attempts: u32) -> Self {
        Self {
            repo,
            attempts: attempts.max(1),
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn repository(&self) -> &dyn ActivityRepository {
        self.repo.as_ref()
    }

    /// Load a board the caller may access.
    ///
    /// A registered caller's account is linked to their guest row in memory,
    /// so views already show the linked identity.
    pub(crate) async fn load(
        &self,
        caller: &Caller,
        id: &ActivityId,
    ) -> Result<Versioned<ActivityBoard>, RallyError> {
        caller.check_scope(id)?;
        let mut loaded = self
            .repo
            .load(id)
            .await?
            .ok_or_else(|| DomainError::ActivityNotFound(id.to_string()))?;
        if let Some(user) = caller.account() {
            loaded.value.link_account(user);
        }
        Ok(loaded)
    }

    /// Load a board and require the caller to be a member of it.
    pub(crate) async fn load_as_member(
        &self,
        caller: &Caller,
        id: &ActivityId,
    ) -> Result<Versioned<ActivityBoard>, RallyError> {
        let loaded = self.load(caller, id).await?;
        if !loaded.value.is_member(&caller.identity()) {
            return Err(DomainError::NotMember.into());
        }
        Ok(loaded)
    }

    /// Apply `apply` to the latest board and commit it.
    ///
    /// On a version conflict the board is reloaded and `apply` runs again, up
    /// to the configured number of attempts. An `Err` from `apply` aborts
    /// without writing. Boards that come out unchanged are not written.
    pub(crate) async fn mutate<T, F>(
        &self,
        caller: &Caller,
        id: &ActivityId,
        mut apply: F,
    ) -> Result<(ActivityBoard, T), RallyError>
    where
        T: Send,
        F: FnMut(&mut ActivityBoard) -> Result<T, RallyError> + Send,
    {
        caller.check_scope(id)?;
        for attempt in 1..=self.attempts {
            let Versioned {
                value: original,
                version,
            } = self.repo.load(id).await?.ok_or_else(|| {
                RallyError::from(DomainError::ActivityNotFound(id.to_string()))
            })?;

            let mut board = original.clone();
            if let Some(user) = caller.account() {
                board.link_account(user);
            }
            let outcome = apply(&mut board)?;
            if board == original {
                return Ok((board, outcome));
            }

            match self.repo.commit(&board, version).await {
                Ok(committed) => {
                    debug!(activity = %id, version = %committed, "Committed activity board");
                    return Ok((board, outcome));
                }
                Err(e) if e.is_conflict() => {
                    debug!(activity = %id, attempt, "Version conflict, reloading");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(activity = %id, attempts = self.attempts, "Giving up after repeated conflicts");
        Err(RallyError::Conflict {
            activity: id.clone(),
            attempts: self.attempts,
        })
    }
}

/// Fire-and-forget wrapper around the dispatcher.
pub(crate) struct Notifier {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl Notifier {
    pub(crate) fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub(crate) async fn comment(&self, activity: &ActivityId, author: &Identity, comment: SystemComment) {
        self.comment_on(CommentTarget::Activity(activity.clone()), author, comment)
            .await;
    }

    pub(crate) async fn comment_on(&self, target: CommentTarget, author: &Identity, comment: SystemComment) {
        if let Err(e) = self
            .dispatcher
            .post_comment(&target, author, &comment.text())
            .await
        {
            warn!(comment_target = %target, error = %e, "Failed to post system comment");
        }
    }

    pub(crate) async fn email(&self, kind: EmailKind, to: &Email, payload: Value) {
        if let Err(e) = self.dispatcher.send_email(kind, to, payload).await {
            warn!(kind = %kind, to = %to, error = %e, "Failed to send e-mail");
        }
    }

    /// Send the same e-mail to every recipient concurrently.
    pub(crate) async fn email_all(&self, kind: EmailKind, recipients: &[Email], payload: Value) {
        join_all(
            recipients
                .iter()
                .map(|to| self.email(kind, to, payload.clone())),
        )
        .await;
    }

    /// Schedule one push per (trigger, user). Returns how many were accepted.
    pub(crate) async fn schedule_reminders(
        &self,
        activity: &Activity,
        users: &[UserId],
        triggers: &[ReminderTrigger],
    ) -> usize {
        let mut scheduled = 0;
        for trigger in triggers {
            for user in users {
                match self
                    .dispatcher
                    .schedule_push(
                        &activity.id,
                        user,
                        &activity.title,
                        &trigger.label,
                        trigger.fire_at,
                    )
                    .await
                {
                    Ok(()) => scheduled += 1,
                    Err(e) => {
                        warn!(activity = %activity.id, user = %user, error = %e, "Failed to schedule reminder")
                    }
                }
            }
        }
        scheduled
    }

    pub(crate) async fn cancel_reminders(&self, activity: &ActivityId) {
        if let Err(e) = self.dispatcher.cancel_reminders(activity).await {
            warn!(activity = %activity, error = %e, "Failed to cancel reminders");
        }
    }
}

/// E-mail addresses of the owner and every accepted participant.
///
/// An owner account that cannot be looked up is logged and left out.
pub(crate) async fn member_emails(directory: &dyn UserDirectory, board: &ActivityBoard) -> Vec<Email> {
    let mut emails = Vec::new();
    match directory.find_by_id(&board.activity().owner).await {
        Ok(Some(owner)) => emails.push(owner.email),
        Ok(None) => warn!(owner = %board.activity().owner, "Owner account missing from directory"),
        Err(e) => warn!(error = %e, "Owner lookup failed"),
    }
    emails.extend(
        board
            .participants()
            .iter()
            .filter(|p| p.is_accepted())
            .map(|p| p.email.clone()),
    );
    emails
}

/// Users who receive reminders: the owner and accepted, registered
/// participants.
pub(crate) fn reminder_recipients(board: &ActivityBoard) -> Vec<UserId> {
    std::iter::once(board.activity().owner.clone())
        .chain(
            board
                .participants()
                .iter()
                .filter(|p| p.is_accepted())
                .filter_map(|p| p.user_id.clone()),
        )
        .collect()
}

/// Template fields shared by every activity e-mail.
pub(crate) fn activity_payload(board: &ActivityBoard) -> Value {
    let activity = board.activity();
    json!({
        "activity_id": activity.id.as_str(),
        "kind": activity.kind.as_str(),
        "title": activity.title,
        "scheduled_at": activity.scheduled_at.map(|t| t.to_rfc3339()),
        "location": activity.location,
        "plan": board.selected_option().map(|o| o.attributes.label()),
    })
}
