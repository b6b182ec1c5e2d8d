//! Activity aggregate
//!
//! - [`entities`] - the activity record, its kind and lifecycle tier
//! - [`participant`] - invitee rows and guest tokens
//! - [`board`] - the aggregate every state transition goes through
//! - [`reminder`] - reminder trigger planning
//! - [`repository`] - storage trait with optimistic versioning

pub mod board;
pub mod entities;
pub mod participant;
pub mod reminder;
pub mod repository;

pub use board::{
    ActivityBoard, FinalizeRequest, Finalization, InviteOutcome, ProposedOption,
    SubmittedAvailability,
};
pub use entities::{Activity, ActivityDetails, ActivityId, ActivityKind, ActivityTier};
pub use participant::{GuestToken, Participant, ParticipantStatus};
pub use reminder::{ReminderPolicy, ReminderTrigger};
pub use repository::{ActivityRepository, RepositoryError, Version, Versioned};
