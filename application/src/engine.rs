//! Engine wiring
//!
//! [`Engine`] holds the adapters behind every port and hands out use cases
//! bound to them. It is cheap to clone.

use crate::config::EngineConfig;
use crate::ports::clock::{Clock, SystemClock, TokenGenerator};
use crate::ports::notification::NotificationDispatcher;
use crate::ports::recommendation::RecommendationService;
use crate::use_cases::finalize_activity::FinalizeActivityUseCase;
use crate::use_cases::manage_activity::ManageActivityUseCase;
use crate::use_cases::manage_options::ManageOptionsUseCase;
use crate::use_cases::manage_participants::ManageParticipantsUseCase;
use crate::use_cases::resolve_identity::IdentityResolver;
use crate::use_cases::schedule_meeting::ScheduleMeetingUseCase;
use crate::use_cases::shared::{BoardStore, Notifier};
use rally_domain::{ActivityRepository, UserDirectory};
use std::sync::Arc;

#[derive(Clone)]
pub struct Engine {
    activities: Arc<dyn ActivityRepository>,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    recommendations: Arc<dyn RecommendationService>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        recommendations: Arc<dyn RecommendationService>,
        tokens: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            activities,
            directory,
            dispatcher,
            recommendations,
            tokens,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn store(&self) -> BoardStore {
        BoardStore::new(Arc::clone(&self.activities), self.config.commit_attempts)
    }

    fn notifier(&self) -> Notifier {
        Notifier::new(Arc::clone(&self.dispatcher))
    }

    pub fn identities(&self) -> IdentityResolver {
        IdentityResolver::new(Arc::clone(&self.directory))
    }

    pub fn activities(&self) -> ManageActivityUseCase {
        ManageActivityUseCase {
            store: self.store(),
            notifier: self.notifier(),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn participants(&self) -> ManageParticipantsUseCase {
        ManageParticipantsUseCase {
            store: self.store(),
            resolver: self.identities(),
            directory: Arc::clone(&self.directory),
            notifier: self.notifier(),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn options(&self) -> ManageOptionsUseCase {
        ManageOptionsUseCase {
            store: self.store(),
            recommendations: Arc::clone(&self.recommendations),
            notifier: self.notifier(),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn meetings(&self) -> ScheduleMeetingUseCase {
        ScheduleMeetingUseCase {
            store: self.store(),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn finalization(&self) -> FinalizeActivityUseCase {
        FinalizeActivityUseCase {
            store: self.store(),
            directory: Arc::clone(&self.directory),
            notifier: self.notifier(),
            clock: Arc::clone(&self.clock),
            reminders: self.config.reminders.clone(),
        }
    }
}
