//! Infrastructure layer for rally
//!
//! This crate contains adapters that implement the ports defined
//! in the domain and application layers: storage, notification delivery,
//! recommendations, caller resolution and configuration file loading.

pub mod auth;
pub mod config;
pub mod notify;
pub mod recommendation;
pub mod store;
pub mod tokens;

// Re-export commonly used types
pub use auth::{GuestTokenAuth, SessionAuth};
pub use config::{
    ConfigLoader, FileConfig, FileEngineConfig, FileOutboxConfig, FileOutputConfig,
    FileRecommendationsConfig, FileRecommendedPlace, FileRemindersConfig, FileStoreConfig,
};
pub use notify::{JsonlOutbox, LoggingDispatcher};
pub use recommendation::StaticCatalog;
pub use store::{InMemoryStore, JsonFileStore, StoreError};
pub use tokens::RandomTokenGenerator;
