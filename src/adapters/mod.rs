//! Adapter interfaces for external collaborators.
//!
//! The core never talks to the realtime voice provider or the alarm
//! registry directly; it goes through these traits so tests and tooling can
//! substitute their own implementations.

pub mod alarms;
pub mod realtime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::domain::{AlarmContext, Voice};

pub use alarms::StaticAlarmRegistry;
pub use realtime::RealtimeClient;

/// Request sent to the voice-session provider
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Provider model identifier, fixed by configuration
    pub model: String,

    /// Assistant voice for this session
    pub voice: Voice,

    /// Final instructions, escalation directive included
    pub instructions: String,

    /// Alarm this session belongs to, passed as session metadata
    pub alarm_id: i64,
}

/// Ephemeral credential for a client-side realtime connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Short-lived key the client presents to the provider
    pub ephemeral_key: String,

    /// The provider's live conversation identifier
    pub session_id: String,

    /// Seconds until the key expires
    pub expires_in_seconds: i64,
}

/// External voice-session provider
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Request an ephemeral session credential.
    ///
    /// Transport failures, non-2xx responses, and malformed bodies all
    /// surface as `Error::Upstream`.
    async fn create_session(&self, request: &SessionRequest) -> Result<SessionCredential>;
}

/// Source of alarm context (voice, instructions) per user and alarm
#[async_trait]
pub trait AlarmRegistry: Send + Sync {
    /// Resolve an alarm owned by the user; `Error::NotFound` otherwise
    async fn get_alarm(&self, user_id: i64, alarm_id: i64) -> Result<AlarmContext>;
}
