//! Schedule Meeting use case
//!
//! Availability submission and the per-slot availability report for
//! meeting-type activities.

use crate::error::RallyError;
use crate::ports::auth_context::Caller;
use crate::ports::clock::Clock;
use crate::use_cases::shared::BoardStore;
use crate::use_cases::views::{AvailabilityReport, TimeSlotView};
use rally_domain::{
    ActivityBoard, ActivityId, SkippedPayload, SlotAvailability, SubmittedAvailability, TimeSlot,
    VoteTally,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ScheduleMeetingUseCase {
    pub(crate) store: BoardStore,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ScheduleMeetingUseCase {
    /// Store the caller's availability, replacing any earlier submission.
    ///
    /// The payload is kept exactly as sent. One that does not parse is still
    /// stored, reported back in `parse_error`, and skipped when matching.
    pub async fn submit_availability(
        &self,
        caller: &Caller,
        id: &ActivityId,
        payload: String,
    ) -> Result<SubmittedAvailability, RallyError> {
        let actor = caller.identity();
        let now = self.clock.now();
        let (_, submitted) = self
            .store
            .mutate(caller, id, |board| {
                Ok(board.submit_availability(&actor, payload.clone(), now)?)
            })
            .await?;

        if let Some(e) = &submitted.parse_error {
            warn!(activity = %id, identity = %actor, error = %e, "Stored availability that does not parse");
        }
        info!(activity = %id, identity = %actor, replaced = submitted.replaced, "Availability submitted");
        Ok(submitted)
    }

    /// Who is free for one slot, whether or not it has been proposed.
    pub async fn slot_availability(
        &self,
        caller: &Caller,
        id: &ActivityId,
        slot: &TimeSlot,
    ) -> Result<SlotAvailability, RallyError> {
        let loaded = self.store.load_as_member(caller, id).await?;
        let matched = loaded.value.slot_availability(slot);
        log_skipped(id, &matched.skipped);
        Ok(matched)
    }

    /// Every time-slot option with its tally and live availability count.
    pub async fn list_time_slots(
        &self,
        caller: &Caller,
        id: &ActivityId,
    ) -> Result<AvailabilityReport, RallyError> {
        let loaded = self.store.load_as_member(caller, id).await?;
        let report = report(&loaded.value);
        log_skipped(id, &report.skipped);
        Ok(report)
    }
}

fn report(board: &ActivityBoard) -> AvailabilityReport {
    let slots = board
        .options()
        .iter()
        .filter_map(|option| {
            let slot = option.attributes.time_slot()?;
            let matched = board.slot_availability(slot);
            Some(TimeSlotView {
                option_id: option.id.clone(),
                slot: *slot,
                selected: option.selected,
                tally: VoteTally::for_option(&option.id, board.votes()),
                availability_count: matched.count(),
                available: matched.available,
            })
        })
        .collect();

    let skipped = board
        .availability()
        .iter()
        .filter_map(|response| {
            response.payload().err().map(|e| SkippedPayload {
                identity: response.identity.clone(),
                reason: e.to_string(),
            })
        })
        .collect();

    AvailabilityReport { slots, skipped }
}

fn log_skipped(id: &ActivityId, skipped: &[SkippedPayload]) {
    for s in skipped {
        warn!(activity = %id, identity = %s.identity, reason = %s.reason, "Skipped malformed availability");
    }
}
