//! Participant rows

use crate::identity::{Email, Identity, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Invited,
    Accepted,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Invited => "invited",
            ParticipantStatus::Accepted => "accepted",
        }
    }
}

/// Activity-scoped capability that lets an unregistered participant respond.
///
/// Bound to exactly one participant row; never rotated and never expires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestToken(String);

impl GuestToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One invitee of an activity.
///
/// The invited e-mail is always kept; `user_id` is filled in once a
/// matching account is known and is never cleared again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub email: Email,
    pub user_id: Option<UserId>,
    pub status: ParticipantStatus,
    pub guest_token: Option<GuestToken>,
    pub invited_at: DateTime<Utc>,
}

impl Participant {
    pub fn invited(email: Email, user_id: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            email,
            user_id,
            status: ParticipantStatus::Invited,
            guest_token: None,
            invited_at: now,
        }
    }

    /// The identity this row's votes and availability are keyed by.
    pub fn identity(&self) -> Identity {
        match &self.user_id {
            Some(id) => Identity::User(id.clone()),
            None => Identity::Guest(self.email.clone()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ParticipantStatus::Accepted
    }
}
