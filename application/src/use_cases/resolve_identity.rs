//! Identity resolution
//!
//! Turns a raw e-mail string into either a registered user or a guest. Pure
//! lookup; nothing is written.

use crate::error::RallyError;
use rally_domain::{Email, ResolvedIdentity, User, UserDirectory};
use std::sync::Arc;
use tracing::debug;

pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Normalize `raw` and look it up.
    ///
    /// Rejects empty or malformed addresses with an `InvalidInput` error.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedIdentity, RallyError> {
        let email = Email::parse(raw)?;
        Ok(match self.account(&email).await? {
            Some(user) => ResolvedIdentity::Registered(user),
            None => ResolvedIdentity::Guest(email),
        })
    }

    /// The registered account behind an already-normalized address.
    pub async fn account(&self, email: &Email) -> Result<Option<User>, RallyError> {
        let found = self.directory.find_by_email(email).await?;
        debug!(email = %email, registered = found.is_some(), "Resolved identity");
        Ok(found)
    }
}
