//! reveille - Wake-up call lifecycle core
//!
//! Manages the lifecycle of voice wake-up calls: starting a call, buffering
//! streamed conversation turns, enforcing the snooze-abuse policy, and
//! finalizing the call's outcome. Session credentials for the realtime
//! voice provider are issued per alarm, with instructions escalated by
//! repeated snoozing.
//!
//! # Architecture
//!
//! - A call is a persisted record: open while `ended_at` is unset, closed
//!   exactly once, immutable afterward
//! - Snooze counts are clamped to [0, 3]; at the cap the outcome is forced
//!   to FAIL_SNOOZE regardless of what the client requested
//! - Live session transcripts accumulate in an in-memory buffer keyed by
//!   the provider's session id
//!
//! # Modules
//!
//! - `adapters`: External collaborators (realtime provider, alarm registry)
//! - `core`: Lifecycle state machine, conversation buffer, session issuer
//! - `domain`: Data structures (CallRecord, Utterance, AlarmContext)
//! - `store`: Persistent call store (SQLite)
//! - `cli`: Command-line interface

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::{
    AlarmRegistry, RealtimeClient, SessionCredential, SessionProvider, SessionRequest,
    StaticAlarmRegistry,
};
pub use core::{CallLifecycle, ConversationBuffer, Error, SessionIssuer};
pub use domain::{CallDetail, CallOutcome, CallRecord, Speaker, Utterance, Voice};
pub use store::{CallStore, SqliteCallStore};
