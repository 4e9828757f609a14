//! Domain types for the wake-up call core.
//!
//! This module contains the core data structures:
//! - CallRecord: one wake-up call and its outcome
//! - Utterance: a single conversation turn
//! - AlarmContext: voice and instructions resolved for an alarm

pub mod alarm;
pub mod call;
pub mod utterance;

// Re-export commonly used types
pub use alarm::{AlarmContext, Voice};
pub use call::{
    clamp_snooze_count, effective_outcome, CallDetail, CallOutcome, CallRecord, MAX_SNOOZE_COUNT,
};
pub use utterance::{Speaker, Utterance};
