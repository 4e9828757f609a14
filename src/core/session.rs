//! Session credential issuance.
//!
//! Orchestrates alarm context lookup, effective snooze resolution, and the
//! provider call that mints an ephemeral realtime credential. Provider
//! failures propagate as `Error::Upstream`; there is deliberately no mock
//! fallback credential.

use std::sync::Arc;

use crate::adapters::{AlarmRegistry, SessionCredential, SessionProvider, SessionRequest};
use crate::core::lifecycle::CallLifecycle;
use crate::core::Result;
use crate::domain::clamp_snooze_count;

/// Issues ephemeral voice-session credentials
pub struct SessionIssuer {
    alarms: Arc<dyn AlarmRegistry>,
    lifecycle: Arc<CallLifecycle>,
    provider: Arc<dyn SessionProvider>,

    /// Provider model identifier, fixed by configuration
    model: String,
}

impl SessionIssuer {
    pub fn new(
        alarms: Arc<dyn AlarmRegistry>,
        lifecycle: Arc<CallLifecycle>,
        provider: Arc<dyn SessionProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            alarms,
            lifecycle,
            provider,
            model: model.into(),
        }
    }

    /// Create a session credential for one alarm.
    ///
    /// The effective snooze count is the explicit value (clamped) when the
    /// caller provides one, otherwise the snooze count of the user's open
    /// call — 0 when no call is open. A positive count appends the
    /// escalation directive to the alarm's instructions so the assistant
    /// persona intensifies its tone.
    pub async fn create_session_credential(
        &self,
        user_id: i64,
        alarm_id: i64,
        explicit_snooze: Option<i64>,
    ) -> Result<SessionCredential> {
        let alarm = self.alarms.get_alarm(user_id, alarm_id).await?;

        let snooze_count = match explicit_snooze {
            Some(requested) => clamp_snooze_count(requested),
            None => self.lifecycle.open_call_snooze_count(user_id),
        };

        let request = SessionRequest {
            model: self.model.clone(),
            voice: alarm.voice,
            instructions: alarm.instructions_with_snooze(snooze_count),
            alarm_id,
        };

        tracing::debug!(user_id, alarm_id, snooze_count, "Requesting session credential");
        self.provider.create_session(&request).await
    }
}
