//! Configuration file loading for rally
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `RALLY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./rally.toml` or `./.rally.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/rally/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileEngineConfig, FileOutboxConfig, FileOutputConfig,
    FileRecommendationsConfig, FileRecommendedPlace, FileRemindersConfig, FileStoreConfig,
};
pub use loader::ConfigLoader;
