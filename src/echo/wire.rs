//! Echo wire messages.
//!
//! The `action` field is carried as a raw `i32` with typed accessors, the way
//! generated protobuf code carries open enums: an unknown value survives
//! decoding and reaches the handler, which rejects it with
//! `INVALID_ARGUMENT` instead of failing at the boundary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server-side action selector, used only to drive demonstration scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ServerAction {
    /// No special action: normal echo handling.
    #[default]
    Unspecified = 0,
    /// Force the handler to return a deadline-exceeded cause.
    ReturnDeadlineExceeded = 1,
    /// Force the handler to return a cancelled cause via the two-task group.
    ReturnCancelled = 2,
}

impl ServerAction {
    /// Convert from the wire value; unknown values return `None`.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::ReturnDeadlineExceeded),
            2 => Some(Self::ReturnCancelled),
            _ => None,
        }
    }

    /// Convert to the i32 wire value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A request to the echo service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EchoRequest {
    /// The text to echo back.
    pub input: String,
    /// Minimum time the server sleeps before responding; the effective sleep
    /// is the maximum of this and the server's own configured sleep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_sleep: Option<Duration>,
    /// Raw action selector value; see [`EchoRequest::action`].
    pub action: i32,
}

impl EchoRequest {
    /// Creates a request with the given input and no special behavior.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// The typed action selector, or `None` for an unknown wire value.
    #[must_use]
    pub const fn action(&self) -> Option<ServerAction> {
        ServerAction::from_i32(self.action)
    }

    /// Sets the action selector.
    #[must_use]
    pub fn with_action(mut self, action: ServerAction) -> Self {
        self.action = action.as_i32();
        self
    }

    /// Sets the requested server-side minimum sleep.
    #[must_use]
    pub fn with_server_sleep(mut self, sleep: Duration) -> Self {
        self.server_sleep = Some(sleep);
        self
    }
}

/// The echo service's response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EchoResponse {
    /// The echoed text.
    pub output: String,
}
