//! In-memory store
//!
//! Holds boards and accounts behind a mutex. Used by tests and as the
//! backing state of [`JsonFileStore`](super::JsonFileStore).

use super::state::StoreState;
use async_trait::async_trait;
use rally_domain::{
    ActivityBoard, ActivityId, ActivityRepository, Email, GuestToken, Identity, RepositoryError,
    User, UserDirectory, UserId, Version, Versioned,
};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Backend("store lock poisoned".to_string()))
    }

    /// Register an account. Returns `None` if the address is taken.
    pub fn register(&self, email: Email, display_name: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.state()?.register(email, display_name))
    }
}

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn insert(&self, board: &ActivityBoard) -> Result<Version, RepositoryError> {
        self.state()?.insert(board)
    }

    async fn load(
        &self,
        id: &ActivityId,
    ) -> Result<Option<Versioned<ActivityBoard>>, RepositoryError> {
        Ok(self.state()?.load(id))
    }

    async fn commit(
        &self,
        board: &ActivityBoard,
        expected: Version,
    ) -> Result<Version, RepositoryError> {
        self.state()?.commit(board, expected)
    }

    async fn delete(&self, id: &ActivityId, expected: Version) -> Result<(), RepositoryError> {
        self.state()?.delete(id, expected)
    }

    async fn find_guest_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<(ActivityId, Identity)>, RepositoryError> {
        Ok(self.state()?.find_guest_token(token))
    }

    async fn list(&self) -> Result<Vec<ActivityBoard>, RepositoryError> {
        Ok(self.state()?.boards())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.state()?.user_by_email(email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state()?.user_by_id(id))
    }
}
