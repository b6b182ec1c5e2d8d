//! Application-level configuration.
//!
//! - [`EngineConfig`] - retry budget and reminder policy

pub mod engine_config;

pub use engine_config::EngineConfig;
