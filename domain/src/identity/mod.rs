//! Identity domain
//!
//! Participants are either registered users or e-mail-only guests. This
//! module holds the normalized [`Email`], the [`Identity`] every row is keyed
//! by, and the [`UserDirectory`] trait used to resolve one into the other.

pub mod directory;
pub mod email;
pub mod entities;

pub use directory::UserDirectory;
pub use email::Email;
pub use entities::{Identity, ResolvedIdentity, User, UserId};
