//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   LinkMonitor / CloudEventMapper / ConnectionSupervisor / Sampler
//!        └── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet
//!                                                               │
//!                                                    ┌──────────┼──────────┐
//!                                                    ▼          ▼          ▼
//!                                                LogWriter   Metrics    Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
