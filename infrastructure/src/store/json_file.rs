//! JSON state file store
//!
//! Keeps the whole state (accounts and versioned boards) in one JSON file
//! that several `rally` processes may share. Every operation takes an
//! advisory lock on a sibling `.lock` file and reads the state from disk;
//! writers hold the lock exclusively across read, version check and
//! persist. The file is replaced through a temporary sibling and a rename,
//! so a crash never leaves a half-written state behind.

use super::state::StoreState;
use async_trait::async_trait;
use fd_lock::RwLock;
use rally_domain::{
    ActivityBoard, ActivityId, ActivityRepository, Email, GuestToken, Identity, RepositoryError,
    User, UserDirectory, UserId, Version, Versioned,
};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("An account for {0} already exists")]
    DuplicateAccount(Email),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn backend(err: StoreError) -> RepositoryError {
    RepositoryError::Backend(err.to_string())
}

/// File-backed [`ActivityRepository`] and [`UserDirectory`].
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    tmp_path: PathBuf,
}

impl JsonFileStore {
    /// Open the state file, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string());
        let store = Self {
            lock_path: path.with_file_name(format!("{}.lock", name)),
            tmp_path: path.with_file_name(format!("{}.{}.tmp", name, std::process::id())),
            path,
        };

        let lock = store.lock_file()?;
        let _guard = lock.read().map_err(|source| store.io_err(source))?;
        let state = store.read_state()?;
        debug!(
            "Opened state file {} ({} accounts, {} activities)",
            store.path.display(),
            state.users.len(),
            state.activities.len()
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an account. Registration lives with the hosting application,
    /// not the engine, so this is not part of [`UserDirectory`].
    pub fn register_user(&self, email: Email, display_name: &str) -> Result<User, StoreError> {
        let created = self.write(|state| Ok(state.register(email.clone(), display_name)))?;
        created.ok_or(StoreError::DuplicateAccount(email))
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_file(&self) -> Result<RwLock<File>, StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|source| self.io_err(source))?;
        Ok(RwLock::new(file))
    }

    /// Current on-disk state. Callers hold the lock.
    fn read_state(&self) -> Result<StoreState, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(StoreState::default()),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
            Err(source) => Err(self.io_err(source)),
        }
    }

    /// Run `f` against the on-disk state under a shared lock.
    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, RepositoryError> {
        let lock = self.lock_file().map_err(backend)?;
        let _guard = lock.read().map_err(|source| backend(self.io_err(source)))?;
        let state = self.read_state().map_err(backend)?;
        Ok(f(&state))
    }

    /// Apply `f` to the on-disk state under an exclusive lock and persist
    /// the result. Nothing is written when `f` fails.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut lock = self.lock_file().map_err(backend)?;
        let _guard = lock.write().map_err(|source| backend(self.io_err(source)))?;
        let mut state = self.read_state().map_err(backend)?;
        let out = f(&mut state)?;
        self.persist(&state).map_err(backend)?;
        Ok(out)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.tmp_path, content).map_err(|source| self.io_err(source))?;
        std::fs::rename(&self.tmp_path, &self.path).map_err(|source| self.io_err(source))
    }
}

#[async_trait]
impl ActivityRepository for JsonFileStore {
    async fn insert(&self, board: &ActivityBoard) -> Result<Version, RepositoryError> {
        self.write(|state| state.insert(board))
    }

    async fn load(
        &self,
        id: &ActivityId,
    ) -> Result<Option<Versioned<ActivityBoard>>, RepositoryError> {
        self.read(|state| state.load(id))
    }

    async fn commit(
        &self,
        board: &ActivityBoard,
        expected: Version,
    ) -> Result<Version, RepositoryError> {
        self.write(|state| state.commit(board, expected))
    }

    async fn delete(&self, id: &ActivityId, expected: Version) -> Result<(), RepositoryError> {
        self.write(|state| state.delete(id, expected))
    }

    async fn find_guest_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<(ActivityId, Identity)>, RepositoryError> {
        self.read(|state| state.find_guest_token(token))
    }

    async fn list(&self) -> Result<Vec<ActivityBoard>, RepositoryError> {
        self.read(StoreState::boards)
    }
}

#[async_trait]
impl UserDirectory for JsonFileStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.read(|state| state.user_by_email(email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.read(|state| state.user_by_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rally_domain::{ActivityDetails, ActivityKind};
    use tempfile::TempDir;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = JsonFileStore::open(&path).unwrap();
        let host = store.register_user(email("host@x.io"), "Host").unwrap();
        let board = ActivityBoard::create(
            ActivityId::new("a1"),
            ActivityKind::Meeting,
            host.id.clone(),
            "Standup",
            Utc::now(),
        )
        .unwrap();
        let v1 = store.insert(&board).await.unwrap();
        store.commit(&board, v1).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let loaded = reopened.load(&ActivityId::new("a1")).await.unwrap().unwrap();
        assert_eq!(loaded.value, board);
        assert_eq!(loaded.version, v1.next());
        assert_eq!(
            reopened.find_by_email(&email("HOST@x.io")).await.unwrap(),
            Some(host)
        );
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("state.json")).unwrap();
        store.register_user(email("ana@x.io"), "Ana").unwrap();
        assert!(matches!(
            store.register_user(email("Ana@X.io"), "Other"),
            Err(StoreError::DuplicateAccount(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::open(&path).unwrap();
        let host = store.register_user(email("host@x.io"), "Host").unwrap();
        let board = ActivityBoard::create(
            ActivityId::new("a1"),
            ActivityKind::Restaurant,
            host.id,
            "Dinner",
            Utc::now(),
        )
        .unwrap();
        store.insert(&board).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store.commit(&board, Version::new(7)).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    fn board(host: &User, id: &str) -> ActivityBoard {
        ActivityBoard::create(
            ActivityId::new(id),
            ActivityKind::Meeting,
            host.id.clone(),
            "Planning",
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stale_commit_from_second_handle_conflicts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let first = JsonFileStore::open(&path).unwrap();
        let host = first.register_user(email("host@x.io"), "Host").unwrap();
        first.insert(&board(&host, "a1")).await.unwrap();

        let second = JsonFileStore::open(&path).unwrap();
        let id = ActivityId::new("a1");
        let mine = first.load(&id).await.unwrap().unwrap();
        let theirs = second.load(&id).await.unwrap().unwrap();
        assert_eq!(mine.version, theirs.version);

        let mut renamed = mine.value.clone();
        renamed
            .update_details(
                &host.identity(),
                ActivityDetails {
                    title: Some("First".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let mut other = theirs.value.clone();
        other
            .update_details(
                &host.identity(),
                ActivityDetails {
                    title: Some("Second".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let committed = first.commit(&renamed, mine.version).await.unwrap();
        let err = second.commit(&other, theirs.version).await.unwrap_err();
        assert!(err.is_conflict());

        let reopened = JsonFileStore::open(&path).unwrap();
        let stored = reopened.load(&id).await.unwrap().unwrap();
        assert_eq!(stored.version, committed);
        assert_eq!(stored.value.activity().title, "First");
    }

    #[tokio::test]
    async fn test_handles_see_each_others_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let first = JsonFileStore::open(&path).unwrap();
        let second = JsonFileStore::open(&path).unwrap();

        let host = first.register_user(email("host@x.io"), "Host").unwrap();
        assert_eq!(
            second.find_by_email(&email("host@x.io")).await.unwrap(),
            Some(host.clone())
        );

        first.insert(&board(&host, "a1")).await.unwrap();
        second.insert(&board(&host, "a2")).await.unwrap();

        let ids: Vec<_> = first
            .list()
            .await
            .unwrap()
            .iter()
            .map(|b| b.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }
}
