//! SessionStore - SQLite persistence for coaching sessions
//!
//! Holds everything the coaching core reads and writes across turns:
//! organization profiles, onboarding intake records, session rows (the
//! opaque progress blob plus the independently writable phase mirror),
//! territory insights, and synthesis records.
//!
//! The store is synchronous; async callers own it behind an actor task.

mod error;
mod records;
mod store;

pub use error::StoreError;
pub use records::{
    IntakeRecord, OrgProfile, SessionKind, SessionRow, SessionStatus, SynthesisRecord, TerritoryInsightRow,
};
pub use store::SessionStore;

/// Current timestamp in Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
