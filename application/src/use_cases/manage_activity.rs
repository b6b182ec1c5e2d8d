//! Manage Activity use case
//!
//! Create, read, list, edit and destroy activities.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::clock::Clock;
use crate::use_cases::shared::{BoardStore, Notifier};
use crate::use_cases::views::{ActivitySummary, ActivityView, MemberRole};
use rally_domain::{ActivityBoard, ActivityDetails, ActivityId, ActivityKind, Versioned};
use std::sync::Arc;
use tracing::{debug, info};

/// Input for creating an activity
#[derive(Debug, Clone)]
pub struct CreateActivityInput {
    pub kind: ActivityKind,
    pub title: String,
    pub location: Option<String>,
    pub welcome_message: Option<String>,
}

impl CreateActivityInput {
    pub fn new(kind: ActivityKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            location: None,
            welcome_message: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }
}

pub struct ManageActivityUseCase {
    pub(crate) store: BoardStore,
    pub(crate) notifier: Notifier,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ManageActivityUseCase {
    /// Create an activity owned by the caller.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateActivityInput,
    ) -> Result<ActivityView, RallyError> {
        let owner = caller
            .account()
            .ok_or(RallyError::RegistrationRequired("create an activity"))?;

        let mut board = ActivityBoard::create(
            ActivityId::generate(),
            input.kind,
            owner.id.clone(),
            &input.title,
            self.clock.now(),
        )?;
        let details = ActivityDetails {
            title: None,
            location: input.location,
            welcome_message: input.welcome_message,
        };
        if !details.is_empty() {
            board.update_details(&owner.identity(), details)?;
        }

        self.store.repository().insert(&board).await?;
        info!(activity = %board.id(), kind = %input.kind, owner = %owner.id, "Created activity");
        Ok(ActivityView::from(&board))
    }

    /// Full view of one activity. Members only.
    pub async fn get(&self, caller: &Caller, id: &ActivityId) -> Result<ActivityView, RallyError> {
        let loaded = self.store.load_as_member(caller, id).await?;
        Ok(ActivityView::from(&loaded.value))
    }

    /// Every activity the caller owns or participates in, oldest first.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<ActivitySummary>, RallyError> {
        let identity = caller.identity();
        let mut summaries: Vec<ActivitySummary> = self
            .store
            .repository()
            .list()
            .await?
            .into_iter()
            .filter(|board| caller.can_access(board.id()))
            .filter_map(|mut board| {
                if let Some(user) = caller.account() {
                    board.link_account(user);
                }
                let role = if board.is_owner(&identity) {
                    MemberRole::Owner
                } else {
                    MemberRole::Participant(board.participant_by_identity(&identity)?.status)
                };
                let activity = board.activity();
                Some(ActivitySummary {
                    id: activity.id.clone(),
                    kind: activity.kind,
                    title: activity.title.clone(),
                    tier: board.tier(),
                    scheduled_at: activity.scheduled_at,
                    role,
                    created_at: activity.created_at,
                })
            })
            .collect();

        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        debug!(count = summaries.len(), "Listed activities");
        Ok(summaries)
    }

    /// Owner edits title, location or welcome message.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &ActivityId,
        details: ActivityDetails,
    ) -> Result<ActivityView, RallyError> {
        let actor = caller.identity();
        let (board, ()) = self
            .store
            .mutate(caller, id, |board| Ok(board.update_details(&actor, details.clone())?))
            .await?;
        info!(activity = %id, "Updated activity details");
        Ok(ActivityView::from(&board))
    }

    /// Owner deletes the activity and everything it owns.
    pub async fn destroy(&self, caller: &Caller, id: &ActivityId) -> Result<(), RallyError> {
        let actor = caller.identity();
        let mut last_error = None;

        for _ in 0..self.store.attempts() {
            let Versioned { value, version } = self.store.load(caller, id).await?;
            value.require_owner(&actor)?;
            match self.store.repository().delete(id, version).await {
                Ok(()) => {
                    info!(activity = %id, "Destroyed activity");
                    self.notifier.cancel_reminders(id).await;
                    return Ok(());
                }
                Err(e) if e.is_conflict() => last_error = Some(e),
                Err(e) => return Err(e.into()),
            }
        }

        debug!(activity = %id, error = ?last_error, "Destroy lost every version race");
        Err(RallyError::Conflict {
            activity: id.clone(),
            attempts: self.store.attempts(),
        })
    }
}
