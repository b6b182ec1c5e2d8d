//! Option pool and voting ledger types.

pub mod entities;
pub mod vote;

pub use entities::{
    OptionAttributes, OptionId, OptionKind, PlaceAttributes, PlanOption, TimeSlot, parse_hhmm,
};
pub use vote::{ToggleOutcome, Vote, VoteOrigin, VoteTally};
