//! Storage and outbox configuration from TOML (`[store]`, `[outbox]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw `[store]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// JSON state file holding users and activities
    pub path: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rally-state.json"),
        }
    }
}

/// Raw `[outbox]` section
///
/// When `path` is set, notifications are appended to that JSONL file;
/// otherwise they are only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutboxConfig {
    pub path: Option<PathBuf>,
}
