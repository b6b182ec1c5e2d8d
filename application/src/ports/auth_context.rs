//! Caller resolution port
//!
//! Who is calling is decided at the request boundary, before any use case
//! runs. A session resolves to a registered user with access to every
//! activity they belong to. A guest token resolves to the participant it was
//! issued for and is scoped to that one activity.

use async_trait::async_trait;
use rally_domain::{
    ActivityId, DomainError, Email, Identity, RepositoryError, ResolvedIdentity, User,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No registered account for {0}")]
    UnknownAccount(String),

    #[error("Unknown guest token")]
    UnknownToken,

    #[error("Lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// The authenticated caller of a use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: ResolvedIdentity,
    /// Set for guest-token callers: the only activity they may touch.
    pub scope: Option<ActivityId>,
}

impl Caller {
    /// A signed-in user.
    pub fn user(user: User) -> Self {
        Self {
            identity: ResolvedIdentity::Registered(user),
            scope: None,
        }
    }

    /// A token holder acting on `activity`.
    pub fn token_holder(identity: ResolvedIdentity, activity: ActivityId) -> Self {
        Self {
            identity,
            scope: Some(activity),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity.identity()
    }

    pub fn email(&self) -> &Email {
        self.identity.email()
    }

    pub fn account(&self) -> Option<&User> {
        self.identity.user()
    }

    pub fn display_name(&self) -> &str {
        self.identity.display_name()
    }

    pub fn can_access(&self, activity: &ActivityId) -> bool {
        self.scope.as_ref().is_none_or(|scope| scope == activity)
    }

    /// Reject token holders reaching outside their activity.
    pub fn check_scope(&self, activity: &ActivityId) -> Result<(), DomainError> {
        if self.can_access(activity) {
            Ok(())
        } else {
            Err(DomainError::NotMember)
        }
    }
}

#[async_trait]
pub trait AuthContext: Send + Sync {
    async fn current_identity(&self) -> Result<Caller, AuthError>;
}
