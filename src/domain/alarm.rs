//! Alarm context supplied by the alarm registry.
//!
//! The registry itself is an external collaborator; the core only needs the
//! voice selection and instructions text for a given alarm, plus the
//! snooze-escalation composition applied before a session is created.

use serde::{Deserialize, Serialize};

use crate::core::Error;

/// Provider voice options for the wake-up assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Sage,
    Shimmer,
    Verse,
}

impl Voice {
    /// Value sent to the realtime API
    pub fn as_api_value(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Ballad => "ballad",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
            Voice::Verse => "verse",
        }
    }

    /// Parse a voice from its API value
    pub fn from_value(value: &str) -> Result<Self, Error> {
        match value {
            "alloy" => Ok(Voice::Alloy),
            "ash" => Ok(Voice::Ash),
            "ballad" => Ok(Voice::Ballad),
            "coral" => Ok(Voice::Coral),
            "echo" => Ok(Voice::Echo),
            "sage" => Ok(Voice::Sage),
            "shimmer" => Ok(Voice::Shimmer),
            "verse" => Ok(Voice::Verse),
            other => Err(Error::Validation(format!("unknown voice: {}", other))),
        }
    }

    /// All API values, in declaration order
    pub fn all_values() -> [&'static str; 8] {
        [
            "alloy", "ash", "ballad", "coral", "echo", "sage", "shimmer", "verse",
        ]
    }
}

/// Voice and instructions resolved for one alarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmContext {
    /// Assistant voice configured for this alarm
    pub voice: Voice,

    /// Base persona instructions
    pub instructions: String,
}

impl AlarmContext {
    pub fn new(voice: Voice, instructions: impl Into<String>) -> Self {
        Self {
            voice,
            instructions: instructions.into(),
        }
    }

    /// Compose the final instructions for a session.
    ///
    /// With no snoozes the base instructions go out verbatim. Otherwise an
    /// escalation directive is appended so the persona intensifies its tone.
    /// The directive is deterministic given the count.
    pub fn instructions_with_snooze(&self, snooze_count: u8) -> String {
        if snooze_count == 0 {
            return self.instructions.clone();
        }
        format!(
            "{}\n\n[IMPORTANT] The user has already snoozed {} time(s). \
             Be more insistent and wake them up!",
            self.instructions, snooze_count
        )
    }
}
