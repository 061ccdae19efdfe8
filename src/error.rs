//! Error types.
//!
//! The taxonomy mirrors the propagation model: a unit that observes its scope
//! as done propagates the cause outward instead of substituting a generic
//! error. The [`TaskGroup`](crate::group::TaskGroup) merge policy is the only
//! place causes are deliberately overwritten.

use crate::types::CancelCause;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal errors produced or observed by the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The operation's scope was explicitly cancelled, by itself or an
    /// ancestor.
    #[error("scope cancelled")]
    Cancelled,
    /// The operation's scope deadline elapsed.
    #[error("scope deadline exceeded")]
    DeadlineExceeded,
    /// Malformed or unsupported request shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Connection-level failure in an external collaborator. The core never
    /// produces this itself.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a transport-failure error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns the scope cause this error carries, if it is one of the two
    /// cancellation-model errors.
    #[must_use]
    pub const fn cause(&self) -> Option<CancelCause> {
        match self {
            Self::Cancelled => Some(CancelCause::Cancelled),
            Self::DeadlineExceeded => Some(CancelCause::DeadlineExceeded),
            Self::InvalidArgument(_) | Self::Transport(_) => None,
        }
    }
}

impl From<CancelCause> for Error {
    fn from(cause: CancelCause) -> Self {
        match cause {
            CancelCause::Cancelled => Self::Cancelled,
            CancelCause::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}
