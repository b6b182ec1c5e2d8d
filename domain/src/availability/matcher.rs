//! Slot availability matching.

use super::payload::{AvailabilityParseError, AvailabilityPayload};
use crate::identity::Identity;
use crate::option::TimeSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One identity's stored availability for an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub identity: Identity,
    /// The JSON payload exactly as submitted.
    pub raw: String,
    pub submitted_at: DateTime<Utc>,
}

impl AvailabilityResponse {
    pub fn payload(&self) -> Result<AvailabilityPayload, AvailabilityParseError> {
        AvailabilityPayload::parse(&self.raw)
    }
}

/// A response that was left out of a computation because it did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPayload {
    pub identity: Identity,
    pub reason: String,
}

/// Who is free for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub available: Vec<Identity>,
    pub skipped: Vec<SkippedPayload>,
}

impl SlotAvailability {
    pub fn count(&self) -> usize {
        self.available.len()
    }
}

/// Evaluate every stored response against `slot`.
///
/// Malformed responses land in `skipped` and are otherwise ignored; they
/// never prevent the remaining responses from being counted.
pub fn match_slot(responses: &[AvailabilityResponse], slot: &TimeSlot) -> SlotAvailability {
    let mut available = Vec::new();
    let mut skipped = Vec::new();

    for response in responses {
        match response.payload() {
            Ok(payload) => {
                if payload.covers(slot) {
                    available.push(response.identity.clone());
                }
            }
            Err(e) => skipped.push(SkippedPayload {
                identity: response.identity.clone(),
                reason: e.to_string(),
            }),
        }
    }

    SlotAvailability {
        slot: *slot,
        available,
        skipped,
    }
}
