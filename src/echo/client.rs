//! The caller boundary.

use crate::echo::loopback::{CallEvent, Loopback};
use crate::echo::wire::{EchoRequest, EchoResponse};
use crate::rpc::{Status, translate};
use crate::scope::Scope;
use crate::types::CancelCause;
use std::sync::mpsc::channel;

/// Client for the echo service.
///
/// A call always returns a terminal status: it resolves with whichever comes
/// first, the peer's terminal reply or the local scope firing. On a local
/// fire the corresponding wire status is synthesized locally and the
/// transport's best-effort cancel signal is raised toward the peer.
pub struct EchoClient {
    transport: Loopback,
}

impl EchoClient {
    /// Creates a client over the given transport.
    #[must_use]
    pub fn new(transport: Loopback) -> Self {
        Self { transport }
    }

    /// The transport this client dispatches through.
    #[must_use]
    pub fn transport(&self) -> &Loopback {
        &self.transport
    }

    /// Issues one echo call under `scope`.
    ///
    /// If the scope has already fired, the request never reaches the service
    /// boundary: the corresponding status is synthesized locally and returned
    /// immediately.
    pub fn call(&self, scope: &Scope, request: EchoRequest) -> Result<EchoResponse, Status> {
        if let Some(cause) = scope.cause() {
            tracing::debug!(cause = %cause, "scope already fired; not dispatching");
            return Err(translate::status_from_cause(cause));
        }

        let (tx, rx) = channel();
        let (_request_scope, remote_cancel) =
            self.transport.dispatch(request, scope.deadline(), tx.clone());

        // A watcher child turns "the call scope fired" into an event on the
        // same channel as the reply, so the wait below is a plain recv. The
        // release handle retires the watcher once the call resolves.
        let (watch, release) = scope.with_cancel();
        let watcher = std::thread::spawn(move || {
            watch.wait();
            let _ = tx.send(CallEvent::ScopeFired);
        });

        let result = match rx.recv() {
            Ok(CallEvent::Reply(reply)) => reply,
            Ok(CallEvent::ScopeFired) => {
                let cause = scope.cause().unwrap_or(CancelCause::Cancelled);
                tracing::debug!(cause = %cause, "scope fired mid-call; synthesizing status");
                remote_cancel.cancel();
                Err(translate::status_from_cause(cause))
            }
            // Both senders gone without a terminal event; per the contract
            // the caller still gets a terminal status.
            Err(_) => Err(Status::unknown("transport dropped without a terminal status")),
        };

        release.cancel();
        let _ = watcher.join();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo::EchoServer;
    use crate::rpc::Code;
    use crate::test_utils::init_test_logging;
    use std::time::Duration;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    fn client() -> EchoClient {
        EchoClient::new(Loopback::new(EchoServer::new(Duration::ZERO)))
    }

    #[test]
    fn plain_call_round_trips() {
        init_test("plain_call_round_trips");
        let root = Scope::root();
        let response = client()
            .call(&root, EchoRequest::new("hello"))
            .expect("echo succeeds");
        assert_eq!(response.output, "echoed: hello");
        crate::test_complete!("plain_call_round_trips");
    }

    #[test]
    fn prefired_scope_never_dispatches() {
        init_test("prefired_scope_never_dispatches");
        let client = client();
        let root = Scope::root();
        let (scope, cancel) = root.with_cancel();
        cancel.cancel();

        let status = client
            .call(&scope, EchoRequest::new("hello"))
            .expect_err("synthesized failure");
        assert_eq!(status.code(), Code::Cancelled);
        assert_eq!(client.transport().server().requests_started(), 0);
        crate::test_complete!("prefired_scope_never_dispatches");
    }

    #[test]
    fn local_deadline_resolves_the_call() {
        init_test("local_deadline_resolves_the_call");
        let client = client();
        let root = Scope::root();
        let scope = root.with_deadline(Duration::from_millis(30));
        let request = EchoRequest::new("slow").with_server_sleep(Duration::from_millis(500));

        let start = std::time::Instant::now();
        let status = client.call(&scope, request).expect_err("local timeout");
        assert_eq!(status.code(), Code::DeadlineExceeded);
        // The call resolved on the local deadline, not the server sleep.
        assert!(start.elapsed() < Duration::from_millis(400));
        crate::test_complete!("local_deadline_resolves_the_call");
    }
}
