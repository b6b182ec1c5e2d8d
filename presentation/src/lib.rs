//! Presentation layer for rally
//!
//! This crate contains CLI definitions and output formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, FinalizeArgs, OutputFormat, ProposePlaceArgs};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{AvailabilityReceipt, CommandOutput, InviteReport};
