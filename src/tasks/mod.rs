//! # Task abstractions.
//!
//! - [`Task`] - trait for implementing async cancelable tasks
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;

pub use task::{Task, TaskRef};
