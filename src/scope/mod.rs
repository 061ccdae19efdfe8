//! The cancellation scope tree.
//!
//! A [`Scope`] is a node in a propagation tree, not a lexical scope. Scopes
//! are derived from a parent with an optional deadline ([`Scope::with_deadline`],
//! [`Scope::with_deadline_at`]) or with an explicit cancel capability
//! ([`Scope::with_cancel`]). Firing a scope — by handle, by deadline, or by
//! an ancestor firing — makes every live descendant done.
//!
//! Firing is push-based: each node keeps weak references to its children and
//! walks them when it fires. Deadlines need no timer thread; waiters perform
//! a timed condvar wait against the effective deadline, and non-blocking
//! queries lazily observe an elapsed deadline.

mod tree;

pub use tree::{CancelHandle, Scope};
