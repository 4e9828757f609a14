//! In-memory conversation buffer for live voice sessions.
//!
//! Accumulates streamed utterances per session id before (or independent
//! of) persistence. Sessions are keyed by the voice provider's live
//! conversation id, which is distinct from the persisted call id.
//!
//! The buffer is an owned component, constructed once and passed to its
//! consumers. Each session holds its own lock, so concurrent appends to
//! different sessions do not contend; appends to the same session are
//! serialized by that session's mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::core::{Error, Result};
use crate::domain::Utterance;

type SessionLog = Arc<Mutex<Vec<Utterance>>>;

/// Concurrent per-session utterance log
#[derive(Default)]
pub struct ConversationBuffer {
    sessions: RwLock<HashMap<String, SessionLog>>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session's log, creating it on first use
    fn session_log(&self, session_id: &str) -> SessionLog {
        {
            let sessions = self.sessions.read().expect("buffer lock poisoned");
            if let Some(log) = sessions.get(session_id) {
                return Arc::clone(log);
            }
        }
        let mut sessions = self.sessions.write().expect("buffer lock poisoned");
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new()))),
        )
    }

    fn append(&self, session_id: &str, utterance: Utterance) -> Result<()> {
        if utterance.text.trim().is_empty() {
            return Err(Error::Validation("utterance text must not be empty".into()));
        }
        let log = self.session_log(session_id);
        let mut entries = log.lock().expect("session lock poisoned");
        entries.push(utterance);
        Ok(())
    }

    /// Append a user turn, timestamped now
    pub fn append_user(&self, session_id: &str, text: &str) -> Result<()> {
        tracing::debug!(session_id, "Buffering user utterance");
        self.append(session_id, Utterance::user(text))
    }

    /// Append an assistant turn, timestamped now
    pub fn append_assistant(&self, session_id: &str, text: &str) -> Result<()> {
        tracing::debug!(session_id, "Buffering assistant utterance");
        self.append(session_id, Utterance::assistant(text))
    }

    /// Append a system message, timestamped now
    pub fn append_system(&self, session_id: &str, text: &str) -> Result<()> {
        tracing::debug!(session_id, "Buffering system message");
        self.append(session_id, Utterance::system(text))
    }

    /// Serialized snapshot of the session's conversation.
    ///
    /// Unknown or empty sessions yield `"[]"`, never an error; a
    /// serialization failure also degrades to `"[]"` with an error log.
    pub fn snapshot_json(&self, session_id: &str) -> String {
        let entries = self.snapshot(session_id);
        match serde_json::to_string(&entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(session_id, "Failed to serialize conversation: {}", e);
                "[]".to_string()
            }
        }
    }

    /// Defensive copy of the session's conversation.
    ///
    /// Mutating the returned vector never affects the buffer.
    pub fn snapshot(&self, session_id: &str) -> Vec<Utterance> {
        let log = {
            let sessions = self.sessions.read().expect("buffer lock poisoned");
            sessions.get(session_id).map(Arc::clone)
        };
        match log {
            Some(log) => log.lock().expect("session lock poisoned").clone(),
            None => Vec::new(),
        }
    }

    /// Drop the session entirely; subsequent reads behave as if it never
    /// existed.
    pub fn clear(&self, session_id: &str) {
        let mut sessions = self.sessions.write().expect("buffer lock poisoned");
        sessions.remove(session_id);
        tracing::debug!(session_id, "Cleared conversation buffer");
    }

    /// Number of buffered utterances for the session (0 if unknown)
    pub fn utterance_count(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().expect("buffer lock poisoned");
        sessions
            .get(session_id)
            .map(|log| log.lock().expect("session lock poisoned").len())
            .unwrap_or(0)
    }

    /// Whether the session has buffered anything
    pub fn has_session(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().expect("buffer lock poisoned");
        sessions.contains_key(session_id)
    }
}
