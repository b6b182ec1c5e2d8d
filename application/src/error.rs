//! Use case errors

use crate::ports::auth_context::AuthError;
use crate::ports::recommendation::RecommendationError;
use rally_domain::{ActivityId, DomainError, ErrorKind, RepositoryError};
use thiserror::Error;

/// Errors returned by every use case.
#[derive(Error, Debug)]
pub enum RallyError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Activity {activity} kept changing underneath; gave up after {attempts} attempts")]
    Conflict { activity: ActivityId, attempts: u32 },

    #[error(transparent)]
    RecommendationUnavailable(#[from] RecommendationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("A registered account is required to {0}")]
    RegistrationRequired(&'static str),
}

impl RallyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RallyError::Domain(e) => e.kind(),
            RallyError::Repository(RepositoryError::Missing(_)) => ErrorKind::NotFound,
            RallyError::Repository(RepositoryError::Conflict { .. })
            | RallyError::Repository(RepositoryError::AlreadyExists(_))
            | RallyError::Conflict { .. } => ErrorKind::Conflict,
            RallyError::Repository(RepositoryError::Backend(_))
            | RallyError::RecommendationUnavailable(_) => ErrorKind::Unavailable,
            RallyError::Auth(AuthError::Repository(_)) => ErrorKind::Unavailable,
            RallyError::Auth(_) | RallyError::RegistrationRequired(_) => ErrorKind::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_passes_domain_kind_through() {
        let err: RallyError = DomainError::AlreadyFinalized.into();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_kind_for_infrastructure_failures() {
        let conflict = RallyError::Conflict {
            activity: ActivityId::new("a1"),
            attempts: 3,
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let rec: RallyError = RecommendationError::Unavailable("down".into()).into();
        assert_eq!(rec.kind(), ErrorKind::Unavailable);

        let auth: RallyError = AuthError::UnknownToken.into();
        assert_eq!(auth.kind(), ErrorKind::Forbidden);
    }
}
