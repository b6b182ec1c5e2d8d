//! Availability matching for meeting-type activities.

pub mod matcher;
pub mod payload;

pub use matcher::{AvailabilityResponse, SkippedPayload, SlotAvailability, match_slot};
pub use payload::{AvailabilityParseError, AvailabilityPayload};
