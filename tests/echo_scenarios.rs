//! End-to-end scenarios for the echo demonstration, driven the way the
//! demonstration client drives them: one client, one server, and a sequence
//! of calls exercising every deadline/cancellation interaction.

use scopetree::echo::{EchoClient, EchoRequest, EchoServer, Loopback, ServerAction};
use scopetree::rpc::{Code, FailureOrigin};
use scopetree::test_utils::init_test_logging;
use scopetree::{CancelCause, Scope};
use std::time::{Duration, Instant};

fn init_test(name: &str) {
    init_test_logging();
    scopetree::test_phase!(name);
}

fn client_with_sleep(response_sleep: Duration) -> EchoClient {
    EchoClient::new(Loopback::new(EchoServer::new(response_sleep)))
}

#[test]
fn plain_request_echoes_the_input() {
    init_test("plain_request_echoes_the_input");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let response = client
        .call(&root, EchoRequest::new("example echo request input"))
        .expect("plain request succeeds");
    assert_eq!(response.output, "echoed: example echo request input");
    assert_eq!(root.cause(), None);
    scopetree::test_complete!("plain_request_echoes_the_input");
}

#[test]
fn client_timeout_shorter_than_server_sleep() {
    init_test("client_timeout_shorter_than_server_sleep");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let scope = root.with_deadline(Duration::from_millis(50));
    let request = EchoRequest::new("example echo request input")
        .with_server_sleep(Duration::from_millis(500));

    let status = client.call(&scope, request).expect_err("local timeout");
    assert_eq!(status.code(), Code::DeadlineExceeded);
    assert_eq!(scope.cause(), Some(CancelCause::DeadlineExceeded));
    assert_eq!(
        FailureOrigin::classify(status.code(), scope.cause()),
        Some(FailureOrigin::LikelyLocalTimeout)
    );
    scopetree::test_complete!("client_timeout_shorter_than_server_sleep");
}

#[test]
fn server_returns_forced_deadline_exceeded() {
    init_test("server_returns_forced_deadline_exceeded");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let request = EchoRequest::new("example echo request input")
        .with_action(ServerAction::ReturnDeadlineExceeded);
    let status = client.call(&root, request).expect_err("forced failure");

    assert_eq!(status.code(), Code::DeadlineExceeded);
    // The caller's scope never fired; the failure is attributed remotely.
    assert_eq!(root.cause(), None);
    assert_eq!(
        FailureOrigin::classify(status.code(), root.cause()),
        Some(FailureOrigin::Remote)
    );
    scopetree::test_complete!("server_returns_forced_deadline_exceeded");
}

#[test]
fn server_returns_forced_cancelled_via_task_group() {
    init_test("server_returns_forced_cancelled_via_task_group");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let request = EchoRequest::new("example echo request input")
        .with_action(ServerAction::ReturnCancelled);
    let status = client.call(&root, request).expect_err("forced failure");

    // The two-task group's deadline fired first, but the last reporter was
    // the cancelled sibling: the wire carries CANCELLED.
    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(
        FailureOrigin::classify(status.code(), root.cause()),
        Some(FailureOrigin::Remote)
    );
    scopetree::test_complete!("server_returns_forced_cancelled_via_task_group");
}

#[test]
fn midflight_cancel_resolves_the_call() {
    init_test("midflight_cancel_resolves_the_call");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let (scope, cancel) = root.with_cancel();
    let request = EchoRequest::new("example echo request input")
        .with_server_sleep(Duration::from_secs(2));

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        cancel.cancel();
    });

    let start = Instant::now();
    let status = client.call(&scope, request).expect_err("cancelled call");
    canceller.join().expect("canceller thread");

    assert_eq!(status.code(), Code::Cancelled);
    // Resolved on the cancel, not the two-second server sleep.
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(
        FailureOrigin::classify(status.code(), scope.cause()),
        Some(FailureOrigin::LikelyLocalCancel)
    );
    scopetree::test_complete!("midflight_cancel_resolves_the_call");
}

#[test]
fn already_cancelled_scope_never_reaches_the_server() {
    init_test("already_cancelled_scope_never_reaches_the_server");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let (scope, cancel) = root.with_cancel();
    cancel.cancel();
    assert_eq!(scope.cause(), Some(CancelCause::Cancelled));

    let before = client.transport().server().requests_started();
    let status = client
        .call(&scope, EchoRequest::new("example echo request input"))
        .expect_err("synthesized failure");

    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(client.transport().server().requests_started(), before);
    scopetree::test_complete!("already_cancelled_scope_never_reaches_the_server");
}

#[test]
fn already_expired_scope_never_reaches_the_server() {
    init_test("already_expired_scope_never_reaches_the_server");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let scope = root.with_deadline(Duration::ZERO);
    assert_eq!(scope.cause(), Some(CancelCause::DeadlineExceeded));

    let before = client.transport().server().requests_started();
    let start = Instant::now();
    let status = client
        .call(&scope, EchoRequest::new("example echo request input"))
        .expect_err("synthesized failure");

    assert_eq!(status.code(), Code::DeadlineExceeded);
    assert_eq!(client.transport().server().requests_started(), before);
    // Synthesized locally: no dispatch, no waiting.
    assert!(start.elapsed() < Duration::from_secs(1));
    scopetree::test_complete!("already_expired_scope_never_reaches_the_server");
}

#[test]
fn unknown_action_reaches_the_server_and_is_rejected() {
    init_test("unknown_action_reaches_the_server_and_is_rejected");
    let client = client_with_sleep(Duration::ZERO);
    let root = Scope::root();

    let mut request = EchoRequest::new("example echo request input");
    request.action = 99;
    let status = client.call(&root, request).expect_err("rejected");

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(client.transport().server().requests_started(), 1);
    assert_eq!(
        FailureOrigin::classify(status.code(), root.cause()),
        Some(FailureOrigin::Remote)
    );
    scopetree::test_complete!("unknown_action_reaches_the_server_and_is_rejected");
}

#[test]
fn configured_server_sleep_applies_when_longer() {
    init_test("configured_server_sleep_applies_when_longer");
    let client = client_with_sleep(Duration::from_millis(30));
    let root = Scope::root();

    let start = Instant::now();
    let response = client
        .call(&root, EchoRequest::new("hello"))
        .expect("echo succeeds");
    assert_eq!(response.output, "echoed: hello");
    assert!(start.elapsed() >= Duration::from_millis(30));
    scopetree::test_complete!("configured_server_sleep_applies_when_longer");
}
