//! Conversation turns exchanged during a wake-up call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person being woken up
    User,

    /// The wake-up assistant persona
    Assistant,

    /// Out-of-band system messages (session markers, notices)
    System,
}

/// A single turn of conversation.
///
/// Timestamps are assigned at construction by the producing component,
/// never taken from a client's wall clock, so ordering within a session
/// stays monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Who spoke
    pub speaker: Speaker,

    /// What was said
    pub text: String,

    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// A user turn, timestamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    /// An assistant turn, timestamped now
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    /// A system message, timestamped now
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, text)
    }
}
