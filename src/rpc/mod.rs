//! Wire status codes and outcome translation.
//!
//! The wire status is a small closed set of outcome codes carried as the
//! terminal result of a call, independent of — but derived from — the local
//! cancellation cause. [`status`] defines the codes; [`translate`] applies
//! the mapping on the serving side and the inverse classification on the
//! initiating side.

pub mod status;
pub mod translate;

pub use status::{Code, Status};
pub use translate::{FailureOrigin, status_from_cause, status_from_error, to_wire};
