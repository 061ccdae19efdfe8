//! Cancellation cause types.
//!
//! A scope that fires records exactly one terminal cause. The unresolved
//! state of the propagation model is `Option<CancelCause>::None`; there is no
//! "pending" variant here because readers only ever observe a monotonic
//! none-to-terminal transition.

use core::fmt;
use serde::{Deserialize, Serialize};

/// The terminal reason a scope became done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CancelCause {
    /// The scope was explicitly cancelled, by its own handle or an ancestor.
    Cancelled,
    /// The scope's deadline elapsed.
    DeadlineExceeded,
}

impl CancelCause {
    /// Returns the canonical lowercase name for this cause.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline exceeded",
        }
    }

    /// Returns true if this cause is a deadline expiry.
    #[must_use]
    pub const fn is_deadline(self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_display_matches_as_str() {
        assert_eq!(CancelCause::Cancelled.to_string(), "cancelled");
        assert_eq!(CancelCause::DeadlineExceeded.to_string(), "deadline exceeded");
        assert_eq!(
            CancelCause::Cancelled.as_str(),
            CancelCause::Cancelled.to_string()
        );
    }

    #[test]
    fn cause_is_deadline() {
        assert!(CancelCause::DeadlineExceeded.is_deadline());
        assert!(!CancelCause::Cancelled.is_deadline());
    }

    #[test]
    fn cause_debug_clone_copy_eq_hash() {
        let cause = CancelCause::DeadlineExceeded;
        let copied = cause;
        assert_eq!(cause, copied);

        let mut set = std::collections::HashSet::new();
        set.insert(CancelCause::Cancelled);
        set.insert(CancelCause::Cancelled);
        assert_eq!(set.len(), 1);
    }
}
