//! Persistent call store.
//!
//! The store is a collaborator of the lifecycle manager: it owns durability
//! and the atomic primitives the lifecycle invariants rely on ("at most one
//! open call per user", "a closed record is immutable"). The reference
//! implementation is SQLite-backed; anything satisfying [`CallStore`] works.

pub mod sqlite;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::Result;
use crate::domain::{CallOutcome, CallRecord};

pub use sqlite::SqliteCallStore;

/// Durable storage for call records.
///
/// Mutating operations must be atomic: `insert_open_call` performs its
/// open-call existence check and the insert as a single unit, and the
/// conditional writes (`update_conversation`, `close_call`) must let a
/// losing racer observe the state the winner left behind.
pub trait CallStore: Send + Sync {
    /// Insert a new open call iff the user has no open call already.
    /// Fails with `Error::Conflict` otherwise.
    fn insert_open_call(&self, record: &CallRecord) -> Result<()>;

    /// Fetch a call owned by the user, `None` if absent or not owned
    fn fetch(&self, user_id: i64, call_id: Uuid) -> Result<Option<CallRecord>>;

    /// Replace the conversation payload of an open call.
    /// `Error::NotFound` if absent, `Error::InvalidState` if closed.
    fn update_conversation(&self, user_id: i64, call_id: Uuid, payload: &str) -> Result<()>;

    /// Close an open call with its final outcome and snooze count.
    /// `Error::NotFound` if absent, `Error::InvalidState` if already closed.
    fn close_call(
        &self,
        user_id: i64,
        call_id: Uuid,
        ended_at: DateTime<Utc>,
        outcome: CallOutcome,
        snooze_count: u8,
    ) -> Result<()>;

    /// Snooze count of the user's open call, `None` when no call is open
    fn open_call_snooze(&self, user_id: i64) -> Result<Option<u8>>;

    /// Number of open calls for the user (0 or 1 when invariants hold)
    fn open_call_count(&self, user_id: i64) -> Result<u32>;
}
