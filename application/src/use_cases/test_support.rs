//! Mock ports shared by the use case tests.

use crate::engine::Engine;
use crate::ports::auth_context::Caller;
use crate::ports::clock::{Clock, TokenGenerator};
use crate::ports::notification::{EmailKind, NotificationDispatcher, NotificationError};
use crate::ports::recommendation::{
    RecommendationContext, RecommendationError, RecommendationService,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rally_domain::{
    ActivityBoard, ActivityId, ActivityRepository, CommentTarget, Email, FinalizeRequest,
    GuestToken, Identity, PlaceAttributes, RepositoryError, User, UserDirectory, UserId, Version, Versioned,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

// ==================== Repository ====================

#[derive(Default)]
pub(crate) struct MockRepository {
    boards: Mutex<HashMap<ActivityId, (ActivityBoard, Version)>>,
    /// Written just before the next commit is checked, as if another
    /// writer got there first.
    interleave: Mutex<Option<ActivityBoard>>,
    pub(crate) commits: Mutex<u32>,
    pub(crate) conflicts: Mutex<u32>,
}

impl MockRepository {
    pub(crate) fn interleave_next_commit(&self, board: ActivityBoard) {
        *self.interleave.lock().unwrap() = Some(board);
    }

    pub(crate) fn stored(&self, id: &ActivityId) -> Option<ActivityBoard> {
        self.boards.lock().unwrap().get(id).map(|(b, _)| b.clone())
    }
}

#[async_trait]
impl ActivityRepository for MockRepository {
    async fn insert(&self, board: &ActivityBoard) -> Result<Version, RepositoryError> {
        let mut boards = self.boards.lock().unwrap();
        if boards.contains_key(board.id()) {
            return Err(RepositoryError::AlreadyExists(board.id().clone()));
        }
        boards.insert(board.id().clone(), (board.clone(), Version::INITIAL));
        Ok(Version::INITIAL)
    }

    async fn load(
        &self,
        id: &ActivityId,
    ) -> Result<Option<Versioned<ActivityBoard>>, RepositoryError> {
        let loaded = self
            .boards
            .lock()
            .unwrap()
            .get(id)
            .map(|(board, version)| Versioned {
                value: board.clone(),
                version: *version,
            });
        // Let concurrent callers load the same version before anyone commits.
        tokio::task::yield_now().await;
        Ok(loaded)
    }

    async fn commit(
        &self,
        board: &ActivityBoard,
        expected: Version,
    ) -> Result<Version, RepositoryError> {
        let mut boards = self.boards.lock().unwrap();
        if let Some(other) = self.interleave.lock().unwrap().take()
            && let Some(entry) = boards.get_mut(other.id())
        {
            *entry = (other, entry.1.next());
        }

        let entry = boards
            .get_mut(board.id())
            .ok_or_else(|| RepositoryError::Missing(board.id().clone()))?;
        if entry.1 != expected {
            *self.conflicts.lock().unwrap() += 1;
            return Err(RepositoryError::Conflict {
                activity: board.id().clone(),
                expected,
                actual: entry.1,
            });
        }
        *entry = (board.clone(), expected.next());
        *self.commits.lock().unwrap() += 1;
        Ok(entry.1)
    }

    async fn delete(&self, id: &ActivityId, expected: Version) -> Result<(), RepositoryError> {
        let mut boards = self.boards.lock().unwrap();
        match boards.get(id) {
            None => Err(RepositoryError::Missing(id.clone())),
            Some((_, actual)) if *actual != expected => Err(RepositoryError::Conflict {
                activity: id.clone(),
                expected,
                actual: *actual,
            }),
            Some(_) => {
                boards.remove(id);
                Ok(())
            }
        }
    }

    async fn find_guest_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<(ActivityId, Identity)>, RepositoryError> {
        Ok(self.boards.lock().unwrap().values().find_map(|(board, _)| {
            board
                .participant_by_token(token)
                .map(|p| (board.id().clone(), p.identity()))
        }))
    }

    async fn list(&self) -> Result<Vec<ActivityBoard>, RepositoryError> {
        Ok(self
            .boards
            .lock()
            .unwrap()
            .values()
            .map(|(b, _)| b.clone())
            .collect())
    }
}

// ==================== Directory ====================

#[derive(Default)]
pub(crate) struct MockDirectory {
    users: Mutex<Vec<User>>,
}

impl MockDirectory {
    pub(crate) fn add(&self, id: &str, email: &str) -> User {
        let user = User::new(UserId::new(id), Email::parse(email).unwrap(), id.to_uppercase());
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }
}

// ==================== Dispatcher ====================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Sent {
    Comment { target: CommentTarget, text: String },
    Email { kind: EmailKind, to: String },
    Push { user: UserId, fire_at: DateTime<Utc> },
    Cancel(ActivityId),
}

#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    pub(crate) sent: Mutex<Vec<Sent>>,
    pub(crate) fail: bool,
}

impl RecordingDispatcher {
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn record(&self, sent: Sent) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Delivery("mailbox on fire".to_string()));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn post_comment(
        &self,
        target: &CommentTarget,
        _author: &Identity,
        text: &str,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Comment {
            target: target.clone(),
            text: text.to_string(),
        })
    }

    async fn send_email(
        &self,
        kind: EmailKind,
        to: &Email,
        _payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Email {
            kind,
            to: to.to_string(),
        })
    }

    async fn schedule_push(
        &self,
        _activity: &ActivityId,
        user: &UserId,
        _title: &str,
        _body: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        self.record(Sent::Push {
            user: user.clone(),
            fire_at,
        })
    }

    async fn cancel_reminders(&self, activity: &ActivityId) -> Result<(), NotificationError> {
        self.record(Sent::Cancel(activity.clone()))
    }
}

// ==================== Recommendations ====================

#[derive(Default)]
pub(crate) struct MockRecommendations {
    pub(crate) places: Vec<PlaceAttributes>,
    pub(crate) down: bool,
    pub(crate) contexts: Mutex<Vec<RecommendationContext>>,
}

#[async_trait]
impl RecommendationService for MockRecommendations {
    async fn fetch(
        &self,
        context: &RecommendationContext,
    ) -> Result<Vec<PlaceAttributes>, RecommendationError> {
        self.contexts.lock().unwrap().push(context.clone());
        if self.down {
            return Err(RecommendationError::Unavailable("timeout".to_string()));
        }
        Ok(self.places.clone())
    }
}

// ==================== Clock & tokens ====================

pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct SequentialTokens(Mutex<u32>);

impl TokenGenerator for SequentialTokens {
    fn guest_token(&self) -> GuestToken {
        let mut n = self.0.lock().unwrap();
        *n += 1;
        GuestToken::new(format!("token-{}", n))
    }
}

// ==================== Harness ====================

pub(crate) struct Harness {
    pub(crate) engine: Engine,
    pub(crate) repo: Arc<MockRepository>,
    pub(crate) directory: Arc<MockDirectory>,
    pub(crate) dispatcher: Arc<RecordingDispatcher>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::build(RecordingDispatcher::default(), MockRecommendations::default())
    }

    pub(crate) fn build(dispatcher: RecordingDispatcher, recommendations: MockRecommendations) -> Self {
        let repo = Arc::new(MockRepository::default());
        let directory = Arc::new(MockDirectory::default());
        let dispatcher = Arc::new(dispatcher);
        let engine = Engine::new(
            repo.clone(),
            directory.clone(),
            dispatcher.clone(),
            Arc::new(recommendations),
            Arc::new(SequentialTokens::default()),
        )
        .with_clock(Arc::new(FixedClock(now())));

        Self {
            engine,
            repo,
            directory,
            dispatcher,
        }
    }
}

/// Finalize with no explicit choices.
pub(crate) async fn finalize_default(h: &Harness, owner: &Caller, id: &ActivityId) {
    h.engine
        .finalization()
        .finalize(owner, id, FinalizeRequest::default())
        .await
        .unwrap();
}
