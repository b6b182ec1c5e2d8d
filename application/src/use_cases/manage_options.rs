//! Manage Options use case
//!
//! The option pool and the voting ledger: propose, remove, vote and list,
//! plus seeding the pool from the recommendation service.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::clock::Clock;
use crate::ports::recommendation::{RecommendationContext, RecommendationService};
use crate::use_cases::shared::{BoardStore, Notifier};
use crate::use_cases::views::OptionView;
use rally_domain::{
    ActivityId, CommentTarget, DomainError, Identity, OptionAttributes, OptionId, OptionKind, PlaceAttributes,
    PlanOption, SkippedPayload, SystemComment, TimeSlot, ToggleOutcome,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of proposing an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalView {
    pub option: OptionView,
    /// Identities whose availability produced a vote on the new slot.
    pub seeded_voters: Vec<Identity>,
    pub skipped: Vec<SkippedPayload>,
}

pub struct ManageOptionsUseCase {
    pub(crate) store: BoardStore,
    pub(crate) recommendations: Arc<dyn RecommendationService>,
    pub(crate) notifier: Notifier,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ManageOptionsUseCase {
    /// Propose any option. Members only, before finalization.
    pub async fn propose(
        &self,
        caller: &Caller,
        id: &ActivityId,
        attributes: OptionAttributes,
    ) -> Result<ProposalView, RallyError> {
        let actor = caller.identity();
        let now = self.clock.now();
        let option_id = OptionId::generate();

        let (board, proposed) = self
            .store
            .mutate(caller, id, |board| {
                Ok(board.propose_option(&actor, option_id.clone(), attributes.clone(), now)?)
            })
            .await?;

        for skipped in &proposed.skipped {
            warn!(activity = %id, identity = %skipped.identity, reason = %skipped.reason, "Skipped malformed availability");
        }
        info!(
            activity = %id,
            option = %proposed.option.id,
            label = %proposed.option.attributes.label(),
            seeded = proposed.seeded_voters.len(),
            "Proposed option"
        );

        Ok(ProposalView {
            option: OptionView::of(&board, &proposed.option),
            seeded_voters: proposed.seeded_voters,
            skipped: proposed.skipped,
        })
    }

    pub async fn propose_place(
        &self,
        caller: &Caller,
        id: &ActivityId,
        place: PlaceAttributes,
    ) -> Result<ProposalView, RallyError> {
        self.propose(caller, id, OptionAttributes::Place(place)).await
    }

    /// Propose a time slot from an ISO date and an `HH:MM` time.
    pub async fn propose_slot(
        &self,
        caller: &Caller,
        id: &ActivityId,
        date: &str,
        time: &str,
    ) -> Result<ProposalView, RallyError> {
        let slot = TimeSlot::parse(date, time)?;
        self.propose(caller, id, OptionAttributes::TimeSlot(slot)).await
    }

    /// Owner removes an option and its votes.
    pub async fn remove(
        &self,
        caller: &Caller,
        id: &ActivityId,
        option: &OptionId,
    ) -> Result<PlanOption, RallyError> {
        let actor = caller.identity();
        let (_, removed) = self
            .store
            .mutate(caller, id, |board| Ok(board.remove_option(&actor, option)?))
            .await?;
        info!(activity = %id, option = %option, "Removed option");

        self.notifier
            .comment_on(
                CommentTarget::Option(removed.id.clone()),
                &actor,
                SystemComment::OptionRemoved {
                    label: removed.attributes.label(),
                },
            )
            .await;
        Ok(removed)
    }

    /// Flip the caller's vote.
    pub async fn toggle_vote(
        &self,
        caller: &Caller,
        id: &ActivityId,
        option: &OptionId,
    ) -> Result<ToggleOutcome, RallyError> {
        let actor = caller.identity();
        let (_, outcome) = self
            .store
            .mutate(caller, id, |board| Ok(board.toggle_vote(&actor, option)?))
            .await?;
        debug!(activity = %id, option = %option, voted = outcome.voted, count = outcome.tally.vote_count, "Toggled vote");
        Ok(outcome)
    }

    /// Add the caller's vote if it is not there yet.
    pub async fn vote(
        &self,
        caller: &Caller,
        id: &ActivityId,
        option: &OptionId,
    ) -> Result<ToggleOutcome, RallyError> {
        self.set_vote(caller, id, option, true).await
    }

    /// Withdraw the caller's vote if there is one.
    pub async fn unvote(
        &self,
        caller: &Caller,
        id: &ActivityId,
        option: &OptionId,
    ) -> Result<ToggleOutcome, RallyError> {
        self.set_vote(caller, id, option, false).await
    }

    async fn set_vote(
        &self,
        caller: &Caller,
        id: &ActivityId,
        option: &OptionId,
        voted: bool,
    ) -> Result<ToggleOutcome, RallyError> {
        let actor = caller.identity();
        let (_, outcome) = self
            .store
            .mutate(caller, id, |board| Ok(board.set_vote(&actor, option, voted)?))
            .await?;
        Ok(outcome)
    }

    /// All options with tallies, in proposal order. Members only.
    pub async fn list(&self, caller: &Caller, id: &ActivityId) -> Result<Vec<OptionView>, RallyError> {
        let loaded = self.store.load_as_member(caller, id).await?;
        Ok(OptionView::all(&loaded.value))
    }

    /// Owner asks the recommendation service for places and proposes them.
    ///
    /// Places whose name is already on the board are skipped. A service
    /// failure leaves the pool untouched.
    pub async fn seed_recommendations(
        &self,
        caller: &Caller,
        id: &ActivityId,
    ) -> Result<Vec<OptionView>, RallyError> {
        let actor = caller.identity();
        let loaded = self.store.load(caller, id).await?;
        let board = &loaded.value;
        board.require_owner(&actor)?;
        if board.activity().finalized {
            return Err(DomainError::OptionsLocked.into());
        }
        if !board.activity().kind.accepts(OptionKind::Place) {
            return Err(DomainError::OptionKindMismatch {
                activity: board.activity().kind.to_string(),
                option: OptionKind::Place.to_string(),
            }
            .into());
        }

        let context = RecommendationContext {
            activity_id: id.clone(),
            kind: board.activity().kind,
            title: board.activity().title.clone(),
            location: board.activity().location.clone(),
            participant_count: board.participants().len(),
            existing: place_names(board.options()),
        };
        let places = self.recommendations.fetch(&context).await.map_err(|e| {
            warn!(activity = %id, error = %e, "Recommendation service failed");
            e
        })?;
        debug!(activity = %id, count = places.len(), "Fetched recommendations");

        let now = self.clock.now();
        let (board, added) = self
            .store
            .mutate(caller, id, |board| {
                let mut known = place_names(board.options());
                let mut added = Vec::new();
                for place in &places {
                    let key = place.name.trim().to_lowercase();
                    if key.is_empty() || known.contains(&key) {
                        continue;
                    }
                    let mut place = place.clone();
                    if place.source.is_none() {
                        place.source = Some("recommendation".to_string());
                    }
                    let proposed = board.propose_option(
                        &actor,
                        OptionId::generate(),
                        OptionAttributes::Place(place),
                        now,
                    )?;
                    known.push(key);
                    added.push(proposed.option.id);
                }
                Ok(added)
            })
            .await?;

        info!(activity = %id, added = added.len(), "Seeded recommendations");
        Ok(board
            .options()
            .iter()
            .filter(|o| added.contains(&o.id))
            .map(|o| OptionView::of(&board, o))
            .collect())
    }
}

/// Lower-cased names of the place options on a board.
fn place_names(options: &[PlanOption]) -> Vec<String> {
    options
        .iter()
        .filter_map(|o| match &o.attributes {
            OptionAttributes::Place(place) => Some(place.name.trim().to_lowercase()),
            OptionAttributes::TimeSlot(_) => None,
        })
        .collect()
}
