//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the link monitor, the cloud event
//! mapper, the connection supervisor, the sampler and the runtime.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `LinkMonitor`, `CloudEventMapper` (from collaborator callback
//!   contexts), `ConnectionSupervisor`, `Sampler`, `Runtime`, `SubscriberSet` workers.
//! - **Consumers**: `Runtime::subscriber_listener()` (fans out to `SubscriberSet`),
//!   and anything holding a receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
