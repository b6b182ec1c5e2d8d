//! Activity and account storage adapters

mod json_file;
mod memory;
mod state;

pub use json_file::{JsonFileStore, StoreError};
pub use memory::InMemoryStore;
