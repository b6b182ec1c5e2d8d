//! Domain error types

use thiserror::Error;

/// Broad classification of a [`DomainError`].
///
/// Request layers map these onto their own status codes, so callers can
/// branch on the class of failure without matching every variant. Domain
/// errors only ever produce the first four; `Conflict` and `Unavailable`
/// come from storage and collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced activity, participant, option or account does not exist.
    NotFound,
    /// The operation is not valid for the activity's current state.
    InvalidState,
    /// The caller is not allowed to perform the operation.
    Forbidden,
    /// The request itself is malformed.
    InvalidInput,
    /// A concurrent writer kept winning; the operation was not applied.
    Conflict,
    /// A collaborator the operation depends on could not be reached.
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    #[error("No participant {0} on this activity")]
    ParticipantNotFound(String),

    #[error("Option not found on this activity: {0}")]
    OptionNotFound(String),

    #[error("No registered account for {0}")]
    UserNotFound(String),

    #[error("{0} has already accepted")]
    AlreadyAccepted(String),

    #[error("{0} has already accepted and can no longer decline")]
    CannotDeclineAccepted(String),

    #[error("Activity is already finalized")]
    AlreadyFinalized,

    #[error("Activity is already completed")]
    AlreadyCompleted,

    #[error("Activity has not been finalized")]
    NotFinalized,

    #[error("Options and votes are locked once the activity is finalized")]
    OptionsLocked,

    #[error("Availability is only collected for meetings, not {0}")]
    AvailabilityNotSupported(String),

    #[error("Only the activity owner can do that")]
    NotOwner,

    #[error("Only members of the activity can do that")]
    NotMember,

    #[error("The owner cannot leave their own activity")]
    OwnerCannotLeave,

    #[error("The owner cannot be removed from their own activity")]
    OwnerCannotBeRemoved,

    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("A {activity} activity does not take {option} options")]
    OptionKindMismatch {
        activity: String,
        option: String,
    },

    #[error("Time slot {0} has already been proposed")]
    DuplicateTimeSlot(String),

    #[error("Invalid time slot: {0}")]
    InvalidTimeSlot(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ActivityNotFound(_)
            | DomainError::ParticipantNotFound(_)
            | DomainError::OptionNotFound(_)
            | DomainError::UserNotFound(_) => ErrorKind::NotFound,

            DomainError::AlreadyAccepted(_)
            | DomainError::CannotDeclineAccepted(_)
            | DomainError::AlreadyFinalized
            | DomainError::AlreadyCompleted
            | DomainError::NotFinalized
            | DomainError::OptionsLocked
            | DomainError::AvailabilityNotSupported(_) => ErrorKind::InvalidState,

            DomainError::NotOwner
            | DomainError::NotMember
            | DomainError::OwnerCannotLeave
            | DomainError::OwnerCannotBeRemoved => ErrorKind::Forbidden,

            DomainError::InvalidEmail(_)
            | DomainError::OptionKindMismatch { .. }
            | DomainError::DuplicateTimeSlot(_)
            | DomainError::InvalidTimeSlot(_)
            | DomainError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_failures_are_classified() {
        assert_eq!(
            DomainError::UserNotFound("a@b.c".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::AlreadyAccepted("a@b.c".into()).kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn test_owner_restrictions_are_forbidden() {
        assert_eq!(DomainError::OwnerCannotLeave.kind(), ErrorKind::Forbidden);
        assert_eq!(DomainError::NotOwner.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::AlreadyFinalized.to_string(),
            "Activity is already finalized"
        );
        assert_eq!(ErrorKind::InvalidState.to_string(), "invalid_state");
    }
}
