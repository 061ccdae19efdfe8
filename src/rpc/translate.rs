//! Outcome translation between the cancellation model and wire statuses.
//!
//! Applied symmetrically: the service boundary maps a handler's terminal
//! outcome to a wire status ([`status_from_error`], [`to_wire`]); the caller
//! boundary classifies a returned status against its own local scope state
//! ([`FailureOrigin::classify`]).

use crate::error::Error;
use crate::rpc::status::{Code, Status};
use crate::types::CancelCause;

/// Maps a scope cause to the wire status a peer would report for it.
#[must_use]
pub fn status_from_cause(cause: CancelCause) -> Status {
    if cause.is_deadline() {
        Status::deadline_exceeded("scope deadline exceeded")
    } else {
        Status::cancelled("scope cancelled")
    }
}

/// Server-side mapping: a handler's terminal error to a wire status.
#[must_use]
pub fn status_from_error(err: &Error) -> Status {
    match err {
        Error::Cancelled => Status::cancelled(err.to_string()),
        Error::DeadlineExceeded => Status::deadline_exceeded(err.to_string()),
        Error::InvalidArgument(message) => Status::invalid_argument(message.clone()),
        Error::Transport(message) => Status::unknown(message.clone()),
    }
}

/// Applies the server-side mapping to a whole handler result, producing what
/// goes on the wire.
pub fn to_wire<T>(result: crate::error::Result<T>) -> Result<T, Status> {
    result.map_err(|err| status_from_error(&err))
}

/// The human-meaningful origin of a failed call, classified from the wire
/// status and the caller's local scope state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    /// The failure originated at the remote side: the local scope never
    /// fired, or it fired with a cause unrelated to the reported code.
    Remote,
    /// Most likely a client-side timeout: the local scope's deadline elapsed
    /// and the wire status agrees. This is a race, not a guarantee — a
    /// server-side deadline failure received just before the local deadline
    /// also elapses is indistinguishable, and misclassifying it is accepted.
    LikelyLocalTimeout,
    /// Most likely a client-side cancel; same race caveat as
    /// [`LikelyLocalTimeout`](Self::LikelyLocalTimeout).
    LikelyLocalCancel,
}

impl FailureOrigin {
    /// Classifies a terminal call result. Returns `None` for `OK` (there is
    /// no failure to attribute).
    #[must_use]
    pub fn classify(code: Code, local_cause: Option<CancelCause>) -> Option<Self> {
        if code == Code::Ok {
            return None;
        }
        Some(match (local_cause, code) {
            (Some(CancelCause::DeadlineExceeded), Code::DeadlineExceeded) => {
                Self::LikelyLocalTimeout
            }
            (Some(CancelCause::Cancelled), Code::Cancelled) => Self::LikelyLocalCancel,
            _ => Self::Remote,
        })
    }
}
