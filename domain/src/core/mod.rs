//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`error::ErrorKind`] - coarse classification of those errors

pub mod error;
