//! Scopetree: a deadline-and-cancellation propagation core.
//!
//! # Overview
//!
//! Scopetree models cooperative cancellation as a tree of scopes. Each scope
//! optionally carries an absolute deadline; cancelling or timing out a parent
//! deterministically fires every descendant, and any operation can cheaply ask
//! "has my scope been cancelled, and why?". Cancellation is a transition, not
//! a deletion: a scope fires at most once and its cause is immutable after.
//!
//! On top of the tree sit two composition layers:
//!
//! - [`TaskGroup`]: N concurrent operations sharing one child scope, merged
//!   to a single terminal outcome with a last-reporter-wins policy. The
//!   policy is deliberately debatable: a deadline failure that triggers
//!   sibling cancellation is reported as `Cancelled` when the cancelled
//!   sibling reports last.
//! - [`rpc`]: the translation boundary between the internal cancellation
//!   model and a small closed set of wire status codes, applied symmetrically
//!   on the serving and initiating sides, including the ambiguity of telling
//!   a locally-raised timeout/cancel apart from one reported by the peer.
//!
//! The [`echo`] module is the demonstration surface: an in-process echo
//! service and client exercising every propagation and translation path.
//!
//! # Core Guarantees
//!
//! - **Monotonic firing**: `is_done` is false until a scope fires and true
//!   forever after; firing is idempotent.
//! - **Bounded deadline wakeup**: an elapsed deadline is observed as
//!   `DeadlineExceeded` with bounded slack, never silently ignored.
//! - **Full fan-out**: firing an ancestor makes every live descendant done
//!   before any waiter observes the descendant as unresolved.
//! - **Terminal status always**: a call through the client boundary never
//!   hangs once its scope has a deadline or has been cancelled.
//!
//! # Module Structure
//!
//! - [`types`]: core value types ([`CancelCause`])
//! - [`scope`]: the cancellation scope tree ([`Scope`], [`CancelHandle`])
//! - [`group`]: concurrent task composition ([`TaskGroup`])
//! - [`rpc`]: wire status codes and outcome translation
//! - [`echo`]: the echo demonstration service, client, and loopback transport
//! - [`error`](mod@error): error types

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod echo;
pub mod error;
pub mod group;
pub mod rpc;
pub mod scope;
pub mod types;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use error::{Error, Result};
pub use group::TaskGroup;
pub use rpc::{Code, FailureOrigin, Status};
pub use scope::{CancelHandle, Scope};
pub use types::CancelCause;
