//! User directory trait

use super::email::Email;
use super::entities::{User, UserId};
use crate::activity::repository::RepositoryError;
use async_trait::async_trait;

/// Read-only view of registered accounts.
///
/// Account creation and authentication belong to the hosting application;
/// the engine only needs to look accounts up.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the account registered under a normalized e-mail.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Find an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
}
