//! Core value types shared across the crate.

mod cancel;

pub use cancel::CancelCause;
