//! The echo demonstration service.
//!
//! Everything in this module is thin glue over the core: an echo handler
//! ([`EchoServer`]) running behind the service boundary, an in-process
//! stand-in for the transport collaborator ([`Loopback`]), and the caller
//! boundary ([`EchoClient`]). The request's action selector exists only to
//! drive the demonstration scenarios server-side.

mod client;
mod loopback;
mod server;
mod wire;

pub use client::EchoClient;
pub use loopback::Loopback;
pub use server::EchoServer;
pub use wire::{EchoRequest, EchoResponse, ServerAction};
