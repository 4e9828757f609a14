//! Error taxonomy for the wake-up call core.

use thiserror::Error;

/// Errors surfaced by the call lifecycle, buffer, and session issuer.
///
/// Policy adjustments (snooze clamping, the snooze-abuse override) never
/// appear here: they are applied silently. Conversation serialization
/// failures degrade to an empty payload with a logged warning instead of
/// erroring. Everything else propagates to the caller unmodified; no
/// component retries on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// No such call or alarm for this user
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user already has an open call
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation not valid in the call's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input where clamping is not the chosen policy
    #[error("Validation failed: {0}")]
    Validation(String),

    /// External voice-session provider failure: transport, non-2xx, or a
    /// malformed response body. Fail-loud, never papered over with a mock
    /// credential.
    #[error("Upstream provider error: {0}")]
    Upstream(String),

    /// Call store failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Convenience alias used throughout the core
pub type Result<T> = std::result::Result<T, Error>;
