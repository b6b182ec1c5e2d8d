//! Caller resolution for the command line.
//!
//! `--as EMAIL` acts as a signed-in account; `--guest-token TOKEN` acts as
//! the invitee the token was issued to, limited to that activity.

use async_trait::async_trait;
use rally_application::{AuthContext, AuthError, Caller};
use rally_domain::{ActivityRepository, Email, GuestToken, ResolvedIdentity, UserDirectory};
use std::sync::Arc;
use tracing::debug;

/// A registered account named by e-mail.
pub struct SessionAuth {
    directory: Arc<dyn UserDirectory>,
    email: String,
}

impl SessionAuth {
    pub fn new(directory: Arc<dyn UserDirectory>, email: impl Into<String>) -> Self {
        Self {
            directory,
            email: email.into(),
        }
    }
}

#[async_trait]
impl AuthContext for SessionAuth {
    async fn current_identity(&self) -> Result<Caller, AuthError> {
        let email =
            Email::parse(&self.email).map_err(|_| AuthError::UnknownAccount(self.email.clone()))?;
        let user = self
            .directory
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::UnknownAccount(email.to_string()))?;
        debug!("Acting as {} ({})", user.email, user.id);
        Ok(Caller::user(user))
    }
}

/// The holder of a guest token.
pub struct GuestTokenAuth {
    activities: Arc<dyn ActivityRepository>,
    directory: Arc<dyn UserDirectory>,
    token: GuestToken,
}

impl GuestTokenAuth {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        directory: Arc<dyn UserDirectory>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            activities,
            directory,
            token: GuestToken::new(token.into()),
        }
    }
}

#[async_trait]
impl AuthContext for GuestTokenAuth {
    async fn current_identity(&self) -> Result<Caller, AuthError> {
        let (activity, _) = self
            .activities
            .find_guest_token(&self.token)
            .await?
            .ok_or(AuthError::UnknownToken)?;

        let board = self
            .activities
            .load(&activity)
            .await?
            .ok_or(AuthError::UnknownToken)?
            .value;
        let participant = board
            .participant_by_token(&self.token)
            .ok_or(AuthError::UnknownToken)?;

        // The invitee may have registered since the token was issued.
        let identity = match self.directory.find_by_email(&participant.email).await? {
            Some(user) => ResolvedIdentity::Registered(user),
            None => ResolvedIdentity::Guest(participant.email.clone()),
        };
        debug!("Guest token resolved to {} on {}", identity.email(), activity);
        Ok(Caller::token_holder(identity, activity))
    }
}
