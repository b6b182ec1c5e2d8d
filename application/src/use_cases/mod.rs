//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod finalize_activity;
pub mod manage_activity;
pub mod manage_options;
pub mod manage_participants;
pub mod resolve_identity;
pub mod schedule_meeting;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;
pub mod views;
