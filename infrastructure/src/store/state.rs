//! Store state shared by the in-memory and JSON-file adapters.

use rally_domain::{
    ActivityBoard, ActivityId, Email, GuestToken, Identity, RepositoryError, User, UserId,
    Version, Versioned,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredBoard {
    pub version: Version,
    pub board: ActivityBoard,
}

/// Everything a store holds: user accounts and versioned boards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub activities: BTreeMap<ActivityId, StoredBoard>,
}

impl StoreState {
    pub fn insert(&mut self, board: &ActivityBoard) -> Result<Version, RepositoryError> {
        if self.activities.contains_key(board.id()) {
            return Err(RepositoryError::AlreadyExists(board.id().clone()));
        }
        self.activities.insert(
            board.id().clone(),
            StoredBoard {
                version: Version::INITIAL,
                board: board.clone(),
            },
        );
        Ok(Version::INITIAL)
    }

    pub fn load(&self, id: &ActivityId) -> Option<Versioned<ActivityBoard>> {
        self.activities.get(id).map(|stored| Versioned {
            value: stored.board.clone(),
            version: stored.version,
        })
    }

    /// Compare-and-swap on the board version.
    pub fn commit(
        &mut self,
        board: &ActivityBoard,
        expected: Version,
    ) -> Result<Version, RepositoryError> {
        let stored = self
            .activities
            .get_mut(board.id())
            .ok_or_else(|| RepositoryError::Missing(board.id().clone()))?;
        if stored.version != expected {
            return Err(RepositoryError::Conflict {
                activity: board.id().clone(),
                expected,
                actual: stored.version,
            });
        }
        stored.version = expected.next();
        stored.board = board.clone();
        Ok(stored.version)
    }

    pub fn delete(&mut self, id: &ActivityId, expected: Version) -> Result<(), RepositoryError> {
        let actual = self
            .activities
            .get(id)
            .map(|stored| stored.version)
            .ok_or_else(|| RepositoryError::Missing(id.clone()))?;
        if actual != expected {
            return Err(RepositoryError::Conflict {
                activity: id.clone(),
                expected,
                actual,
            });
        }
        self.activities.remove(id);
        Ok(())
    }

    pub fn find_guest_token(&self, token: &GuestToken) -> Option<(ActivityId, Identity)> {
        self.activities.values().find_map(|stored| {
            stored
                .board
                .participant_by_token(token)
                .map(|p| (stored.board.id().clone(), p.identity()))
        })
    }

    pub fn boards(&self) -> Vec<ActivityBoard> {
        self.activities.values().map(|s| s.board.clone()).collect()
    }

    pub fn user_by_email(&self, email: &Email) -> Option<User> {
        self.users.iter().find(|u| &u.email == email).cloned()
    }

    pub fn user_by_id(&self, id: &UserId) -> Option<User> {
        self.users.iter().find(|u| &u.id == id).cloned()
    }

    /// Add an account. Returns `None` if the address is already registered.
    pub fn register(&mut self, email: Email, display_name: &str) -> Option<User> {
        if self.user_by_email(&email).is_some() {
            return None;
        }
        let display_name = match display_name.trim() {
            "" => email.local_part().to_string(),
            name => name.to_string(),
        };
        let user = User::new(UserId::generate(), email, display_name);
        self.users.push(user.clone());
        Some(user)
    }
}
