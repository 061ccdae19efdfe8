//! In-process stand-in for the transport collaborator.
//!
//! The real collaborator is a connection-oriented transport that delivers a
//! request, a response, and a terminal status, and carries scope cancellation
//! to the peer as a best-effort signal. `Loopback` reproduces exactly that
//! contract on threads: the request is served under a scope derived from the
//! wire deadline beneath the server's own root, the handler's outcome goes
//! through the server-side status mapping, and the [`CancelHandle`] returned
//! alongside the request scope is the mid-flight cancellation signal.

use crate::echo::server::EchoServer;
use crate::echo::wire::{EchoRequest, EchoResponse};
use crate::rpc::{Status, translate};
use crate::scope::{CancelHandle, Scope};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Instant;

/// An event delivered to the caller boundary's wait loop.
pub(crate) enum CallEvent {
    /// The service boundary produced a terminal result.
    Reply(Result<EchoResponse, Status>),
    /// The caller's local scope fired before a reply arrived.
    ScopeFired,
}

/// In-process transport connecting an [`EchoClient`](crate::echo::EchoClient)
/// to an [`EchoServer`].
pub struct Loopback {
    server: Arc<EchoServer>,
    root: Scope,
}

impl Loopback {
    /// Creates a loopback transport serving requests with `server`.
    #[must_use]
    pub fn new(server: EchoServer) -> Self {
        Self {
            server: Arc::new(server),
            root: Scope::root(),
        }
    }

    /// The server behind this transport.
    #[must_use]
    pub fn server(&self) -> &EchoServer {
        &self.server
    }

    /// Dispatches a request to the service boundary.
    ///
    /// Derives the server-side request scope as a child of the server root,
    /// bounded by the wire deadline, and serves the request on its own
    /// thread; the terminal reply arrives on `tx`. Returns the request scope
    /// together with the handle that is the best-effort cancellation signal
    /// from caller to service.
    pub(crate) fn dispatch(
        &self,
        request: EchoRequest,
        wire_deadline: Option<Instant>,
        tx: Sender<CallEvent>,
    ) -> (Scope, CancelHandle) {
        let bounded = match wire_deadline {
            Some(deadline) => self.root.with_deadline_at(deadline),
            None => self.root.clone(),
        };
        let (request_scope, cancel) = bounded.with_cancel();
        let server = Arc::clone(&self.server);
        let handler_scope = request_scope.clone();
        std::thread::spawn(move || {
            let reply = translate::to_wire(server.handle(&handler_scope, &request));
            // The caller may already have returned with a locally synthesized
            // status; delivery failure is expected then.
            let _ = tx.send(CallEvent::Reply(reply));
        });
        (request_scope, cancel)
    }
}
