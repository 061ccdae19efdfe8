//! Concurrent task composition over one shared scope.
//!
//! A [`TaskGroup`] runs a fixed set of operations concurrently, each given a
//! clone of a single shared child scope derived (with a cancel capability)
//! from the group's parent. Outcomes are collected in completion order over a
//! bounded channel. The first non-success report proactively cancels the
//! shared scope so siblings unblock instead of running to completion.
//!
//! # Merge policy: last reporter wins
//!
//! After every task has reported, the group's outcome is the cause reported
//! by the *last* task to report — not the first, and not the most specific.
//! If task A times out and that triggers cancellation of task B, and B
//! reports after A, the group's outcome is `Cancelled` (B's cause) even
//! though the timeout happened first and causally triggered everything. The
//! overwrite is unconditional: a trailing success report would likewise
//! overwrite an earlier cause. Arguably a bug, but it is the documented
//! behavior this group exists to demonstrate; it is pinned by tests and must
//! not be replaced with a causally-first merge.

use crate::scope::{CancelHandle, Scope};
use crate::types::CancelCause;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

/// A task's terminal report: `None` for domain success, or the cause the
/// task's scope fired with.
pub type TaskReport = Option<CancelCause>;

/// A fixed set of concurrently executed operations sharing one cancellation
/// scope, merged to one outcome.
///
/// Spawn the tasks, then call [`join`](TaskGroup::join) to collect every
/// report and obtain the merged outcome. The shared scope is cancelled on
/// return regardless of outcome (resource cleanup); on the all-success path
/// no task observes that cleanup cancel as a failure cause.
pub struct TaskGroup {
    shared: Scope,
    cancel: CancelHandle,
    tx: Sender<TaskReport>,
    rx: Receiver<TaskReport>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskGroup {
    /// Creates a group whose shared scope is a cancellable child of `parent`.
    #[must_use]
    pub fn new(parent: &Scope) -> Self {
        let (shared, cancel) = parent.with_cancel();
        let (tx, rx) = channel();
        Self {
            shared,
            cancel,
            tx,
            rx,
            handles: Vec::new(),
        }
    }

    /// The shared scope the group's tasks run under.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.shared
    }

    /// Starts an operation against the shared scope.
    ///
    /// The operation receives a clone of the shared scope and may derive its
    /// own sub-scopes from it. It is expected to return its scope's cause
    /// once the scope fires, or `None` if it completes first. Cancellation is
    /// cooperative: an operation that ignores its scope runs to completion.
    pub fn spawn<F>(&mut self, f: F)
    where
        F: FnOnce(Scope) -> TaskReport + Send + 'static,
    {
        let scope = self.shared.clone();
        let tx = self.tx.clone();
        self.handles.push(std::thread::spawn(move || {
            let report = f(scope);
            // The collector may have stopped listening if a sibling panicked;
            // a failed send is not an error for the reporting task.
            let _ = tx.send(report);
        }));
    }

    /// Waits for every task to report and returns the merged outcome.
    ///
    /// The first non-`None` report cancels the shared scope; the returned
    /// outcome is whatever the last reporter said. A panicking task's payload
    /// is resumed here after collection.
    pub fn join(self) -> TaskReport {
        let Self {
            shared: _,
            cancel,
            tx,
            rx,
            handles,
        } = self;
        // Only the tasks hold senders now; a closed channel means the
        // remaining tasks exited without reporting.
        drop(tx);

        let mut last = None;
        for _ in 0..handles.len() {
            match rx.recv() {
                Ok(report) => {
                    if let Some(cause) = report {
                        tracing::debug!(cause = %cause, "collected terminal cause; cancelling sub-tasks");
                        cancel.cancel();
                    }
                    last = report;
                }
                Err(_) => break,
            }
        }
        tracing::debug!(outcome = ?last, "task group returning");

        // Cleanup cancel on the success path too; by now every task has
        // reported, so none observes it as a failure cause.
        cancel.cancel();
        for handle in handles {
            if let Err(payload) = handle.join() {
                std::panic::resume_unwind(payload);
            }
        }
        last
    }
}
