//! Call records and outcome classification.
//!
//! A CallRecord tracks one wake-up call from start to close. The open/closed
//! distinction is carried by `ended_at`: `None` means the call is still in
//! progress and the outcome is provisional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::utterance::Utterance;

/// Snooze counts are clamped into this range at every write boundary.
pub const MAX_SNOOZE_COUNT: u8 = 3;

/// Final classification of a wake-up call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOutcome {
    /// The user woke up and talked
    Success,

    /// The call connected but the user never engaged
    FailNoTalk,

    /// The user hit the snooze cap; forced by policy, see `effective_outcome`
    FailSnooze,
}

impl CallOutcome {
    /// Wire name, matching the persisted form
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Success => "SUCCESS",
            CallOutcome::FailNoTalk => "FAIL_NO_TALK",
            CallOutcome::FailSnooze => "FAIL_SNOOZE",
        }
    }

    /// Parse a persisted outcome string
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(CallOutcome::Success),
            "FAIL_NO_TALK" => Some(CallOutcome::FailNoTalk),
            "FAIL_SNOOZE" => Some(CallOutcome::FailSnooze),
            _ => None,
        }
    }
}

/// Clamp a client-supplied snooze count into `[0, MAX_SNOOZE_COUNT]`.
///
/// Out-of-range values are a policy adjustment, not an error.
pub fn clamp_snooze_count(requested: i64) -> u8 {
    requested.clamp(0, MAX_SNOOZE_COUNT as i64) as u8
}

/// Apply the snooze-abuse policy: at the cap, the outcome is forced to
/// `FailSnooze` no matter what the client asked for. Silent override,
/// never a rejection.
pub fn effective_outcome(requested: CallOutcome, clamped_snooze: u8) -> CallOutcome {
    if clamped_snooze >= MAX_SNOOZE_COUNT {
        CallOutcome::FailSnooze
    } else {
        requested
    }
}

/// One wake-up call as persisted in the call store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier, generated by the core
    pub id: Uuid,

    /// Owning user (authenticated upstream)
    pub user_id: i64,

    /// When the call started; immutable after creation
    pub started_at: DateTime<Utc>,

    /// When the call ended; `None` while the call is open
    pub ended_at: Option<DateTime<Utc>>,

    /// Provisional while open, final once `ended_at` is set
    pub outcome: CallOutcome,

    /// Times the user snoozed during this call, in `[0, 3]`
    pub snooze_count: u8,

    /// Serialized conversation payload (JSON array of utterances)
    pub conversation_payload: String,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl CallRecord {
    /// Create a fresh open call for a user
    pub fn open(user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            started_at: now,
            ended_at: None,
            // Provisional until end_call decides the real outcome
            outcome: CallOutcome::Success,
            snooze_count: 0,
            conversation_payload: "[]".to_string(),
            created_at: now,
        }
    }

    /// Whether the call is still in progress
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Deserialize the conversation payload, tolerating malformed data.
    ///
    /// A payload that fails to parse yields an empty conversation rather
    /// than failing the whole read.
    pub fn conversation(&self) -> Vec<Utterance> {
        if self.conversation_payload.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&self.conversation_payload) {
            Ok(utterances) => utterances,
            Err(e) => {
                tracing::error!(
                    call_id = %self.id,
                    "Failed to parse conversation payload: {}",
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Read model returned by `call_detail`
#[derive(Debug, Clone, Serialize)]
pub struct CallDetail {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub outcome: CallOutcome,
    pub snooze_count: u8,
    pub conversation: Vec<Utterance>,
    pub created_at: DateTime<Utc>,
}

impl From<CallRecord> for CallDetail {
    fn from(record: CallRecord) -> Self {
        let conversation = record.conversation();
        Self {
            id: record.id,
            started_at: record.started_at,
            ended_at: record.ended_at,
            outcome: record.outcome,
            snooze_count: record.snooze_count,
            conversation,
            created_at: record.created_at,
        }
    }
}
