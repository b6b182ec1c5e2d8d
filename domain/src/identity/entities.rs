//! Identity entities: registered users, guests, and the resolved identity
//! that every participant-scoped row is keyed by.

use super::email::Email;
use serde::{Deserialize, Serialize};

/// Identifier of a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}

impl User {
    pub fn new(id: UserId, email: Email, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email,
            display_name: display_name.into(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::User(self.id.clone())
    }
}

/// Who a participant row, vote or availability response belongs to.
///
/// A guest is known only by their normalized e-mail. Once a matching account
/// exists the guest is re-keyed to [`Identity::User`]; the reverse never
/// happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Identity {
    User(UserId),
    Guest(Email),
}

impl Identity {
    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest(_))
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(id) => Some(id),
            Identity::Guest(_) => None,
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::User(id) => write!(f, "user:{}", id),
            Identity::Guest(email) => write!(f, "guest:{}", email),
        }
    }
}

/// Result of resolving an e-mail address against the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    Registered(User),
    Guest(Email),
}

impl ResolvedIdentity {
    pub fn identity(&self) -> Identity {
        match self {
            ResolvedIdentity::Registered(user) => user.identity(),
            ResolvedIdentity::Guest(email) => Identity::Guest(email.clone()),
        }
    }

    pub fn email(&self) -> &Email {
        match self {
            ResolvedIdentity::Registered(user) => &user.email,
            ResolvedIdentity::Guest(email) => email,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            ResolvedIdentity::Registered(user) => Some(user),
            ResolvedIdentity::Guest(_) => None,
        }
    }

    /// Name to use in system comments.
    pub fn display_name(&self) -> &str {
        match self {
            ResolvedIdentity::Registered(user) => &user.display_name,
            ResolvedIdentity::Guest(email) => email.local_part(),
        }
    }
}
