//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! Storage and account lookup are domain traits
//! ([`ActivityRepository`](rally_domain::ActivityRepository),
//! [`UserDirectory`](rally_domain::UserDirectory)); the ports here cover the
//! collaborators the engine talks to around them.

pub mod auth_context;
pub mod clock;
pub mod notification;
pub mod recommendation;
