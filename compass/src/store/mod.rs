//! Store access layer
//!
//! The SQLite-backed [`sessionstore::SessionStore`] is synchronous; the
//! async core talks to it through a single actor task that owns the
//! connection. Commands carry oneshot reply channels.

mod manager;
mod messages;

pub use manager::{StoreHandle, spawn_store};
pub use messages::{StoreCommand, StoreError};
