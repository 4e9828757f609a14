//! Core components of the wake-up call service.
//!
//! This module contains:
//! - CallLifecycle: the per-user call state machine
//! - ConversationBuffer: concurrent per-session utterance log
//! - SessionIssuer: ephemeral realtime credential orchestration
//! - Error: the shared error taxonomy

pub mod buffer;
pub mod error;
pub mod lifecycle;
pub mod session;

// Re-export commonly used types
pub use buffer::ConversationBuffer;
pub use error::{Error, Result};
pub use lifecycle::CallLifecycle;
pub use session::SessionIssuer;
