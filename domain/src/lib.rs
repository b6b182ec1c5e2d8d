//! Domain layer for rally
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Activity board
//!
//! Every activity owns its participants, candidate options, votes and
//! availability. [`ActivityBoard`] holds all of them and is the only place
//! where they change, so each operation either applies completely or not at
//! all.
//!
//! ## Lifecycle
//!
//! - **Collecting**: no options yet
//! - **Voting**: at least one option, not finalized
//! - **Finalized**: the plan is locked; options and votes are frozen
//! - **Completed**: terminal
//!
//! ## Identity
//!
//! Rows are keyed by [`Identity`]: a registered user, or a guest known only
//! by e-mail. Guest rows move to the user once an account is linked.

pub mod activity;
pub mod availability;
pub mod comment;
pub mod config;
pub mod core;
pub mod identity;
pub mod option;

// Re-export commonly used types
pub use activity::{
    Activity, ActivityBoard, ActivityDetails, ActivityId, ActivityKind, ActivityRepository,
    ActivityTier, FinalizeRequest, Finalization, GuestToken, InviteOutcome, Participant,
    ParticipantStatus, ProposedOption, ReminderPolicy, ReminderTrigger, RepositoryError,
    SubmittedAvailability, Version, Versioned,
};
pub use availability::{
    AvailabilityParseError, AvailabilityPayload, AvailabilityResponse, SkippedPayload,
    SlotAvailability, match_slot,
};
pub use comment::{CommentTarget, SystemComment};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::{DomainError, ErrorKind};
pub use identity::{Email, Identity, ResolvedIdentity, User, UserDirectory, UserId};
pub use option::{
    OptionAttributes, OptionId, OptionKind, PlaceAttributes, PlanOption, TimeSlot, ToggleOutcome,
    Vote, VoteOrigin, VoteTally,
};
