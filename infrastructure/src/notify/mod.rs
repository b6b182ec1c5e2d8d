//! Notification dispatchers

mod log_dispatcher;
mod outbox;

pub use log_dispatcher::LoggingDispatcher;
pub use outbox::JsonlOutbox;
