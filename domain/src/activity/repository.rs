//! Activity repository trait
//!
//! The unit of storage is the whole [`ActivityBoard`]: the activity plus its
//! participants, options, votes and availability. Writes use optimistic
//! concurrency on a per-board [`Version`], so two writers racing on the same
//! activity cannot both win, while different activities never contend.

use super::board::ActivityBoard;
use super::entities::ActivityId;
use super::participant::GuestToken;
use crate::identity::Identity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monotonic revision number of a stored board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    pub const INITIAL: Version = Version(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A loaded board together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

/// Errors raised by storage adapters.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The board changed since it was loaded.
    #[error("Concurrent modification of activity {activity}: expected {expected}, found {actual}")]
    Conflict {
        activity: ActivityId,
        expected: Version,
        actual: Version,
    },

    #[error("Activity {0} already exists")]
    AlreadyExists(ActivityId),

    #[error("Activity {0} does not exist")]
    Missing(ActivityId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict { .. })
    }
}

/// Storage for activity boards.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Store a brand-new board at [`Version::INITIAL`].
    async fn insert(&self, board: &ActivityBoard) -> Result<Version, RepositoryError>;

    /// Load a board, or `None` if it does not exist.
    async fn load(&self, id: &ActivityId)
    -> Result<Option<Versioned<ActivityBoard>>, RepositoryError>;

    /// Replace a board if it is still at `expected`; returns the new version.
    async fn commit(
        &self,
        board: &ActivityBoard,
        expected: Version,
    ) -> Result<Version, RepositoryError>;

    /// Delete a board (and everything it owns) if it is still at `expected`.
    async fn delete(&self, id: &ActivityId, expected: Version) -> Result<(), RepositoryError>;

    /// Find which activity and participant a guest token belongs to.
    async fn find_guest_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<(ActivityId, Identity)>, RepositoryError>;

    /// Every stored board. Used for listing; adapters may return them in any
    /// order.
    async fn list(&self) -> Result<Vec<ActivityBoard>, RepositoryError>;
}
