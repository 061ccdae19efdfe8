//! The echo handler behind the service boundary.

use crate::echo::wire::{EchoRequest, EchoResponse, ServerAction};
use crate::error::{Error, Result};
use crate::group::TaskGroup;
use crate::scope::Scope;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// The echo service handler.
///
/// Holds the configured minimum response sleep and an instance-owned request
/// counter; no process-wide state.
pub struct EchoServer {
    response_sleep: Duration,
    request_id: AtomicI64,
}

impl EchoServer {
    /// Creates a server that sleeps at least `response_sleep` before a normal
    /// echo response.
    #[must_use]
    pub fn new(response_sleep: Duration) -> Self {
        Self {
            response_sleep,
            request_id: AtomicI64::new(0),
        }
    }

    /// Number of requests that have reached the handler.
    ///
    /// Lets tests assert that short-circuited calls never arrive here.
    #[must_use]
    pub fn requests_started(&self) -> i64 {
        self.request_id.load(Ordering::SeqCst)
    }

    /// Handles one echo request inside the given request scope.
    ///
    /// The normal path sleeps the larger of the configured and the requested
    /// sleep, deliberately ignoring the scope: cancellation is cooperative,
    /// and this unit demonstrates one that runs to completion regardless.
    pub fn handle(&self, scope: &Scope, request: &EchoRequest) -> Result<EchoResponse> {
        let request_id = self.request_id.fetch_add(1, Ordering::SeqCst) + 1;
        let remaining = scope
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        tracing::info!(request_id, deadline_remaining = ?remaining, "starting echo request");

        match request.action() {
            Some(ServerAction::Unspecified) => {
                let sleep = self
                    .response_sleep
                    .max(request.server_sleep.unwrap_or_default());
                if !sleep.is_zero() {
                    std::thread::sleep(sleep);
                }
                tracing::info!(
                    request_id,
                    input_bytes = request.input.len(),
                    slept = ?sleep,
                    scope_cause = ?scope.cause(),
                    "echoing"
                );
                Ok(EchoResponse {
                    output: format!("echoed: {}", request.input),
                })
            }
            Some(ServerAction::ReturnDeadlineExceeded) => {
                let timed = scope.with_deadline(Duration::from_nanos(10));
                let cause = timed.wait();
                tracing::info!(request_id, cause = %cause, "forced deadline action returning");
                Err(Error::from(cause))
            }
            Some(ServerAction::ReturnCancelled) => {
                tracing::info!(request_id, "forced cancel action; spawning two sub-tasks");
                match sim_two_tasks(scope) {
                    Some(cause) => {
                        tracing::info!(request_id, cause = %cause, "forced cancel action returning");
                        Err(Error::from(cause))
                    }
                    // The group merged to success; mirror the original, which
                    // would return an empty response in this (unreachable in
                    // practice) case.
                    None => Ok(EchoResponse::default()),
                }
            }
            None => {
                tracing::warn!(request_id, action = request.action, "unknown action value");
                Err(Error::invalid_argument(format!(
                    "unknown action value {}",
                    request.action
                )))
            }
        }
    }
}

/// Runs two tasks in parallel that respect cancellation. Task one times out
/// on a 10 ns sub-deadline, which cancels the other. The group's collection
/// loop keeps the last report instead of the first, so it returns `Cancelled`
/// instead of the `DeadlineExceeded` that happened first — arguably a bug,
/// but it is the documented behavior this demonstration exists to show.
fn sim_two_tasks(parent: &Scope) -> Option<crate::types::CancelCause> {
    let mut group = TaskGroup::new(parent);

    group.spawn(|scope| {
        // Task one: times out.
        let timed = scope.with_deadline(Duration::from_nanos(10));
        let cause = timed.wait();
        tracing::debug!(cause = %cause, "sub task one returning");
        Some(cause)
    });

    group.spawn(|scope| {
        // Task two: a longer task that respects cancellation (a stand-in for
        // an outbound call).
        let cause = scope.wait();
        tracing::debug!(cause = %cause, "sub task two returning");
        Some(cause)
    });

    group.join()
}
