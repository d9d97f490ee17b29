//! Command handlers - chat front-end to service bridge
//!
//! Handlers never fail: every outcome, including errors, becomes a
//! [`CommandReply`] whose message is shown to the user.

mod linking;
mod members;

pub use linking::*;
pub use members::*;
use serde::Serialize;

/// User-visible result of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub success: bool,
    /// Text shown to the user.
    pub message: String,
}

impl CommandReply {
    /// Successful reply.
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    /// Failed reply; `message` says why.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}
