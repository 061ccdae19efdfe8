//! Scope nodes, derivation, and firing.

use crate::types::CancelCause;
use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// A node in the cancellation propagation tree.
///
/// `Scope` is a cheap, cloneable handle; clones observe the same node. A
/// scope fires at most once, with a [`CancelCause`] that is immutable for the
/// rest of its lifetime. Firing an ancestor fires every live descendant with
/// the same cause.
///
/// The root scope has no deadline and is never fired automatically; only a
/// derived [`CancelHandle`] or a derived deadline can fire a branch below it.
#[derive(Clone)]
pub struct Scope {
    node: Arc<ScopeNode>,
}

/// Capability to force a scope's cause to [`CancelCause::Cancelled`].
///
/// Obtained from [`Scope::with_cancel`]. Cancelling a scope that already has
/// a cause is a no-op.
#[derive(Clone)]
pub struct CancelHandle {
    node: Arc<ScopeNode>,
}

struct ScopeNode {
    /// Effective deadline: the minimum of the parent's effective deadline and
    /// the deadline requested at derivation. `None` means no deadline anywhere
    /// on the ancestor chain.
    deadline: Option<Instant>,
    state: Mutex<ScopeState>,
    fired: Condvar,
}

struct ScopeState {
    cause: Option<CancelCause>,
    children: SmallVec<[Weak<ScopeNode>; 4]>,
}

impl ScopeNode {
    fn unfired(deadline: Option<Instant>) -> Arc<Self> {
        Arc::new(Self {
            deadline,
            state: Mutex::new(ScopeState {
                cause: None,
                children: SmallVec::new(),
            }),
            fired: Condvar::new(),
        })
    }

    /// Sets the cause if the node has not fired yet, wakes waiters, and
    /// propagates the same cause to every live child. Returns `true` if this
    /// call performed the transition.
    fn fire(&self, cause: CancelCause) -> bool {
        let children = {
            let mut state = self.state.lock();
            if state.cause.is_some() {
                return false;
            }
            state.cause = Some(cause);
            self.fired.notify_all();
            std::mem::take(&mut state.children)
        };
        tracing::trace!(cause = %cause, children = children.len(), "scope fired");
        for child in children {
            if let Some(child) = child.upgrade() {
                child.fire(cause);
            }
        }
        true
    }

    /// Non-blocking cause query with the lazy own-deadline check: a scope
    /// whose deadline has elapsed observes itself as `DeadlineExceeded` on
    /// any query, even if nothing ever waits on it.
    fn poll_cause(&self) -> Option<CancelCause> {
        if let Some(cause) = self.state.lock().cause {
            return Some(cause);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire(CancelCause::DeadlineExceeded);
                // A concurrent cancel may have won the race; report whatever
                // actually landed in the cell.
                self.state.lock().cause
            }
            _ => None,
        }
    }
}

impl Scope {
    /// Creates a root scope: no deadline, never fired automatically.
    #[must_use]
    pub fn root() -> Self {
        Self {
            node: ScopeNode::unfired(None),
        }
    }

    /// Derives a child scope whose effective deadline is
    /// `min(parent_deadline, now + timeout)`.
    ///
    /// A zero timeout (or an effective deadline that has already elapsed)
    /// yields a scope that is `DeadlineExceeded` at creation. A timeout too
    /// large to represent as an `Instant` is no bound at all: the child
    /// carries only the parent's effective deadline.
    #[must_use]
    pub fn with_deadline(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline_at(deadline),
            None => self.derive(None),
        }
    }

    /// Derives a child scope with an absolute deadline, clamped to the
    /// parent's effective deadline.
    #[must_use]
    pub fn with_deadline_at(&self, deadline: Instant) -> Self {
        self.derive(Some(deadline))
    }

    /// Derives a child scope plus the capability to cancel it.
    ///
    /// The child inherits the parent's effective deadline. Cancelling via the
    /// handle fires the child (and its descendants) with
    /// [`CancelCause::Cancelled`]; it never affects the parent.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let child = self.derive(None);
        let handle = CancelHandle {
            node: Arc::clone(&child.node),
        };
        (child, handle)
    }

    /// Returns true once the scope has a terminal cause. Non-blocking.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.node.poll_cause().is_some()
    }

    /// Returns the terminal cause, or `None` while the scope is unresolved.
    #[must_use]
    pub fn cause(&self) -> Option<CancelCause> {
        self.node.poll_cause()
    }

    /// Returns the effective deadline, if any ancestor (or this scope)
    /// carries one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.node.deadline
    }

    /// Blocks the calling thread until the scope fires and returns the cause.
    ///
    /// Wakes promptly on an explicit cancel (self or ancestor), the scope's
    /// own deadline, or an ancestor's deadline. The ancestor-deadline case
    /// needs no signal from the ancestor: the effective deadline was clamped
    /// at derivation, so the timed wait below covers it.
    pub fn wait(&self) -> CancelCause {
        let mut state = self.node.state.lock();
        loop {
            if let Some(cause) = state.cause {
                return cause;
            }
            match self.node.deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        drop(state);
                        self.node.fire(CancelCause::DeadlineExceeded);
                        state = self.node.state.lock();
                    } else {
                        // Spurious wakeups and timeout wakeups both fall
                        // through to the re-check at the top of the loop.
                        let _ = self.node.fired.wait_until(&mut state, deadline);
                    }
                }
                None => self.node.fired.wait(&mut state),
            }
        }
    }

    /// Derives a child node, clamping the deadline and registering the child
    /// with the parent. If the parent has already fired, the child is born
    /// fired with the parent's cause; if the effective deadline has already
    /// elapsed, the child is born `DeadlineExceeded`.
    fn derive(&self, deadline: Option<Instant>) -> Self {
        let effective = match (self.node.deadline, deadline) {
            (Some(parent), Some(requested)) => Some(parent.min(requested)),
            (parent, requested) => parent.or(requested),
        };
        let child = Self {
            node: ScopeNode::unfired(effective),
        };

        let parent_cause = {
            let mut state = self.node.state.lock();
            match state.cause {
                Some(cause) => Some(cause),
                None => {
                    // Drop registrations for children that no longer exist so
                    // long-lived parents do not accumulate dead slots.
                    state.children.retain(|weak| weak.strong_count() > 0);
                    state.children.push(Arc::downgrade(&child.node));
                    None
                }
            }
        };

        if let Some(cause) = parent_cause {
            child.node.fire(cause);
        } else if let Some(deadline) = effective {
            if Instant::now() >= deadline {
                child.node.fire(CancelCause::DeadlineExceeded);
            }
        }
        child
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("cause", &self.node.state.lock().cause)
            .field("deadline", &self.node.deadline)
            .finish()
    }
}

impl CancelHandle {
    /// Fires the scope with [`CancelCause::Cancelled`].
    ///
    /// Returns `true` if this call performed the transition; cancelling an
    /// already-fired scope returns `false` and changes nothing.
    pub fn cancel(&self) -> bool {
        self.node.fire(CancelCause::Cancelled)
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cause", &self.node.state.lock().cause)
            .finish()
    }
}
