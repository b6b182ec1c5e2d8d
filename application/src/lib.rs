//! Application layer for rally
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod engine;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::RallyError;
pub use ports::{
    auth_context::{AuthContext, AuthError, Caller},
    clock::{Clock, SystemClock, TokenGenerator},
    notification::{EmailKind, NotificationDispatcher, NotificationError},
    recommendation::{RecommendationContext, RecommendationError, RecommendationService},
};
pub use use_cases::finalize_activity::{FinalizeOutput, RescheduleOutput};
pub use use_cases::manage_activity::CreateActivityInput;
pub use use_cases::manage_options::ProposalView;
pub use use_cases::resolve_identity::IdentityResolver;
pub use use_cases::views::{
    ActivitySummary, ActivityView, AvailabilityReport, GuestTokenGrant, MemberRole, OptionView,
    ParticipantView, TimeSlotView,
};
