//! Time and token sources
//!
//! Injected so tests can pin the current time and the minted guest tokens.

use chrono::{DateTime, Utc};
use rally_domain::GuestToken;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of fresh guest tokens.
pub trait TokenGenerator: Send + Sync {
    fn guest_token(&self) -> GuestToken;
}
