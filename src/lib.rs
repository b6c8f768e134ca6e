//! # linkvisor
//!
//! **Linkvisor** coordinates the connectivity lifecycle of a cellular IoT device: it
//! waits for the link, connects the cloud transport, detects readiness and loss at
//! either layer, and drives an orderly reset-and-retry cycle, while data-producing
//! tasks block until the connection is usable.
//!
//! The link stack, the cloud transport and the sensor are external collaborators,
//! plugged in through the [`Link`], [`Transport`] and [`Sensor`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   modem stack                      cloud transport
//!       │ LinkEvent                       │ TransportEvent
//!       ▼                                 ▼
//! ┌─────────────┐                 ┌──────────────────┐
//! │ LinkMonitor │                 │ CloudEventMapper │   (callback contexts, never block)
//! └──────┬──────┘                 └────────┬─────────┘
//!        │ post / reset                    │ post
//!        ▼                                 ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │ Registers: link, cloud (generation-counted), clock      │
//! └──────┬──────────────────────────┬───────────────────────┘
//!        │ wait                     │ wait
//!        ▼                          ▼
//! ┌──────────────────────┐   ┌───────────────┐
//! │ ConnectionSupervisor │   │ ReadinessGate │◄── Sampler (reads Sensor,
//! │ (state machine task) │   └───────────────┘             sends via Transport)
//! └──────────┬───────────┘
//!            │ connect / disconnect / reset
//!            ▼
//!      cloud transport
//!
//! Every component ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter, custom
//! ```
//!
//! ### Connection cycle
//! ```text
//! AwaitingLink ─► ConnectingCloud ─► AwaitingReady ─┬─► Ready ─(disconnect)─┐
//!      ▲                                            └─(timeout/disconnect)──┤
//!      └──────────── reestablish_delay ◄── Resetting(cause) ◄───────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Registers**     | Typed signal registers with blocking waits and generations.   | [`EventRegister`], [`Registers`]            |
//! | **Collaborators** | Boundaries to the modem, the transport and the sensor.        | [`Link`], [`Transport`], [`Sensor`]         |
//! | **Supervision**   | Link → cloud → ready → reset state machine.                   | [`ConnectionSupervisor`], [`Phase`]         |
//! | **Readiness**     | Query/wait surface for data-producing tasks.                  | [`ReadinessGate`], [`Sampler`]              |
//! | **Runtime**       | Runs tasks, handles OS signals, graceful shutdown.            | [`Runtime`], [`Task`]                       |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics).                | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors; fatal vs. self-healing is explicit.             | [`RuntimeError`], [`TaskError`]             |
//! | **Configuration** | Timeouts and delays.                                          | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use linkvisor::{Config, LinkRef, Runtime, SensorRef, Subscribe, TaskRef, TransportRef};
//!
//! async fn start(link: LinkRef, transport: TransportRef, sensor: SensorRef) -> Result<(), linkvisor::RuntimeError> {
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     let rt = Runtime::new(Config::default(), subs);
//!
//!     let tasks: Vec<TaskRef> = vec![
//!         Arc::new(rt.connection(link, transport.clone())),
//!         Arc::new(rt.sampler(transport, sensor)),
//!     ];
//!     rt.run(tasks).await
//! }
//! ```
mod cloud;
mod config;
mod core;
mod error;
mod events;
mod link;
mod readiness;
mod register;
mod subscribers;
mod tasks;
mod telemetry;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use cloud::{
    CloudEventMapper, Outbound, SampleMessage, Transport, TransportEvent, TransportEventKind,
    TransportRef,
};
pub use config::Config;
pub use crate::core::{ConnectionSupervisor, Phase, ResetCause, Runtime};
pub use error::{LinkError, RuntimeError, SensorError, TaskError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use link::{Link, LinkEvent, LinkMonitor, LinkRef, RegistrationStatus, RrcMode};
pub use readiness::ReadinessGate;
pub use register::{
    ClockSignal, ClockState, CloudSignal, CloudState, EventRegister, LinkSignal, LinkState,
    RegisterState, Registers, Session,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskRef};
pub use telemetry::{Sample, Sampler, Sensor, SensorRef};

// Optional: built-in subscriber that renders events through `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
