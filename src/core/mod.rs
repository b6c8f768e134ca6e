//! Runtime core: the connection state machine and task orchestration.
//!
//! Public API from this module:
//! - [`ConnectionSupervisor`] with its [`Phase`] and [`ResetCause`]
//! - [`Runtime`], which owns the shared context and runs tasks
//!
//! Internal modules:
//! - [`runner`]: runs one task and publishes its lifecycle;
//! - [`alive`]: tracks running tasks for stuck-task reports;
//! - [`shutdown`]: OS termination signals.

mod alive;
mod connection;
mod phase;
mod runner;
mod runtime;
mod shutdown;

pub use connection::ConnectionSupervisor;
pub use phase::{Phase, ResetCause};
pub use runtime::Runtime;
