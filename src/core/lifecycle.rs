//! Call lifecycle state machine.
//!
//! Per user: NO_ACTIVE_CALL → CALL_OPEN → CALL_CLOSED, with CALL_CLOSED
//! terminal per call instance. The manager owns the policy (snooze clamping,
//! snooze-abuse override, tolerant payload handling) and delegates atomicity
//! to the call store's transactional primitives.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{Error, Result};
use crate::domain::{
    clamp_snooze_count, effective_outcome, CallDetail, CallOutcome, CallRecord, Utterance,
};
use crate::store::CallStore;

/// Manages the lifecycle of wake-up call records
pub struct CallLifecycle {
    store: Arc<dyn CallStore>,
}

impl CallLifecycle {
    pub fn new(store: Arc<dyn CallStore>) -> Self {
        Self { store }
    }

    /// Start a new call for the user.
    ///
    /// Fails with `Error::Conflict` when a call is already in progress; the
    /// existence check and the insert are one atomic store operation, so two
    /// concurrent starts cannot both succeed.
    pub fn start_call(&self, user_id: i64) -> Result<CallRecord> {
        let record = CallRecord::open(user_id);
        self.store.insert_open_call(&record)?;

        tracing::info!(user_id, call_id = %record.id, "Started call");
        Ok(record)
    }

    /// Replace the persisted conversation payload of an open call.
    ///
    /// The client sends its accumulated view, so the authoritative payload
    /// is fully replaced rather than extended. A serialization failure
    /// degrades to an empty payload with a warning instead of failing the
    /// request.
    pub fn append_transcript(
        &self,
        user_id: i64,
        call_id: Uuid,
        utterances: &[Utterance],
    ) -> Result<()> {
        let payload = match serde_json::to_string(utterances) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    call_id = %call_id,
                    "Failed to serialize transcript, storing empty payload: {}",
                    e
                );
                "[]".to_string()
            }
        };

        self.store.update_conversation(user_id, call_id, &payload)?;

        tracing::info!(
            user_id,
            call_id = %call_id,
            utterances = utterances.len(),
            "Saved transcript"
        );
        Ok(())
    }

    /// Close an open call, applying snooze policy.
    ///
    /// The requested snooze count is clamped to [0, 3]; at the cap the
    /// outcome is forced to FAIL_SNOOZE regardless of what the client asked
    /// for. Both adjustments are silent. The conditional store write makes a
    /// concurrent second close observe `Error::InvalidState`. No points are
    /// awarded here; scoring subsystems read closed records on their own.
    pub fn end_call(
        &self,
        user_id: i64,
        call_id: Uuid,
        ended_at: DateTime<Utc>,
        requested_outcome: CallOutcome,
        requested_snooze: i64,
    ) -> Result<()> {
        let snooze_count = clamp_snooze_count(requested_snooze);
        let outcome = effective_outcome(requested_outcome, snooze_count);

        if outcome != requested_outcome {
            tracing::info!(
                user_id,
                call_id = %call_id,
                requested = requested_outcome.as_str(),
                "Snooze cap reached, overriding outcome to FAIL_SNOOZE"
            );
        }

        self.store
            .close_call(user_id, call_id, ended_at, outcome, snooze_count)?;

        tracing::info!(
            user_id,
            call_id = %call_id,
            outcome = outcome.as_str(),
            snooze_requested = requested_snooze,
            snooze_count,
            "Ended call"
        );
        Ok(())
    }

    /// Read one call, deserializing its conversation tolerantly
    pub fn call_detail(&self, user_id: i64, call_id: Uuid) -> Result<CallDetail> {
        let record = self
            .store
            .fetch(user_id, call_id)?
            .ok_or_else(|| Error::NotFound(format!("no call {} for user {}", call_id, user_id)))?;
        Ok(CallDetail::from(record))
    }

    /// Snooze count of the user's open call, 0 when none.
    ///
    /// Never fails: this feeds an advisory decision (session escalation),
    /// so store failures degrade to 0 with a warning.
    pub fn open_call_snooze_count(&self, user_id: i64) -> u8 {
        match self.store.open_call_snooze(user_id) {
            Ok(Some(snooze)) => snooze,
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(user_id, "Failed to look up open-call snooze count: {}", e);
                0
            }
        }
    }
}
