//! # Lifecycle events emitted by the connection coordinator.
//!
//! The [`EventKind`] enum classifies events across five groups:
//! - **Runtime events**: task lifecycle, shutdown, subscriber health
//! - **Link events**: registration transitions reported by the link monitor
//! - **Transport events**: callbacks mapped by the cloud event mapper
//! - **Supervisor events**: connect cycle progression and resets
//! - **Sampler events**: data-producing task outcomes
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! emitting component, status codes, delays and the connect cycle number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use linkvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ConnectAttemptFailed)
//!     .with_task("connection")
//!     .with_reason("ready timeout")
//!     .with_cycle(3)
//!     .with_timeout(Duration::from_secs(60));
//!
//! assert_eq!(ev.kind, EventKind::ConnectAttemptFailed);
//! assert_eq!(ev.task.as_deref(), Some("connection"));
//! assert_eq!(ev.timeout_ms, Some(60_000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::ResetCause;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason` ("full" or "closed")
    SubscriberOverflow,

    // === Runtime events ===
    /// Shutdown requested (OS signal or embedding future).
    ShutdownRequested,

    /// All tasks stopped within configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some tasks did not stop in time.
    ///
    /// Sets: `reason` (stuck task names)
    GraceExceeded,

    /// Task started.
    ///
    /// Sets: `task`
    TaskStarting,

    /// Task finished successfully or was cancelled.
    ///
    /// Sets: `task`
    TaskStopped,

    /// Task returned a non-fatal error.
    ///
    /// Sets: `task`, `reason`
    TaskFailed,

    /// Task returned a fatal error; it will not be restarted.
    ///
    /// Sets: `task`, `reason`
    TaskDead,

    // === Link events ===
    /// Link became registered (home or roaming).
    ///
    /// Sets: `task`, `reason` (registration status)
    LinkConnected,

    /// Link left the registered state.
    ///
    /// Sets: `task`, `reason` (registration status)
    LinkLost,

    /// Radio resource control mode changed (log-only).
    ///
    /// Sets: `task`, `reason` ("connected" or "idle")
    RrcModeChanged,

    // === Transport events ===
    /// Transport is connecting (log-only).
    TransportConnecting,

    /// Transport session established; `Connected` posted.
    TransportConnected,

    /// Backend requested user association; `AssociationRequest` posted.
    AssociationRequested,

    /// User association completed.
    ///
    /// Sets: `reason` ("pending" when a disconnect follows, "no association pending" otherwise)
    UserAssociated,

    /// Session ready; `Ready` posted.
    CloudReady,

    /// `Disconnected` posted.
    ///
    /// Sets: `reason` (what triggered the disconnect)
    DisconnectSignaled,

    /// Transport reported a connect error (no state change).
    ///
    /// Sets: `status`
    TransportConnectError,

    /// Transport reported a generic error (no state change).
    ///
    /// Sets: `status`
    TransportError,

    /// Informational transport callback (data ack, shadow delta).
    ///
    /// Sets: `reason`
    TransportNotice,

    /// Transport delivered an event kind the mapper does not know.
    ///
    /// Sets: `status` (raw kind)
    UnknownTransportEvent,

    // === Supervisor events ===
    /// A collaborator library failed to initialize. The supervisor stops.
    ///
    /// Sets: `task`, `reason`, `status`
    InitFailed,

    /// Supervisor waits for the link.
    ///
    /// Sets: `task`, `cycle`
    AwaitingLink,

    /// Link is up; a connect attempt follows.
    ///
    /// Sets: `task`, `cycle`
    LinkAvailable,

    /// Connect request issued to the transport.
    ///
    /// Sets: `task`, `cycle`
    CloudConnectRequested,

    /// The connect request itself failed. The ready wait still runs.
    ///
    /// Sets: `task`, `cycle`, `reason`, `status`
    CloudConnectRequestFailed,

    /// No transport session within `connect_timeout`. Advisory only.
    ///
    /// Sets: `task`, `cycle`, `timeout_ms`
    CloudConnectTimeout,

    /// Supervisor waits for readiness.
    ///
    /// Sets: `task`, `cycle`, `timeout_ms`
    AwaitingReady,

    /// Session is ready; the device is usable.
    ///
    /// Sets: `task`, `cycle`, `generation`
    ConnectionReady,

    /// Readiness not reached (timeout or disconnect during handshake).
    ///
    /// Sets: `task`, `cycle`, `reason`, `timeout_ms`
    ConnectAttemptFailed,

    /// Disconnect observed while ready.
    ///
    /// Sets: `task`, `cycle`
    ConnectionLost,

    /// Reset sequence started.
    ///
    /// Sets: `task`, `cycle`, `cause`, `delay_ms` (settle delay)
    ResetStarted,

    /// Transport disconnect request succeeded or there was nothing to disconnect.
    ///
    /// Sets: `task`, `cycle`, `reason`
    TeardownComplete,

    /// Transport disconnect request failed; the reset continues anyway.
    ///
    /// Sets: `task`, `cycle`, `reason`, `status`
    TeardownFailed,

    /// Cloud register cleared; a new generation starts.
    ///
    /// Sets: `task`, `cycle`, `generation`
    RegisterCleared,

    /// Pause before the next cycle.
    ///
    /// Sets: `task`, `cycle`, `delay_ms`
    ReestablishScheduled,

    // === Sampler events ===
    /// "Device online" announcement sent after first readiness.
    DeviceOnline,

    /// Wall-clock time not known within the configured timeout; sampling proceeds.
    ///
    /// Sets: `task`, `timeout_ms`
    TimeUnknown,

    /// Sample sent.
    ///
    /// Sets: `task`, `reason` (app id)
    SampleSent,

    /// Sample read or send failed.
    ///
    /// Sets: `task`, `reason`, `status` (transport code, if any)
    SampleFailed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Emitting component or task name.
    pub task: Option<Arc<str>>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
    /// Status code reported by a collaborator.
    pub status: Option<i32>,
    /// Timeout involved, in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Delay before the next step, in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Connect cycle number (starting from 1).
    pub cycle: Option<u64>,
    /// Cloud register generation.
    pub generation: Option<u64>,
    /// Why a reset started.
    pub cause: Option<ResetCause>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            status: None,
            timeout_ms: None,
            delay_ms: None,
            cycle: None,
            generation: None,
            cause: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting component name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a collaborator status code.
    #[inline]
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches an optional collaborator status code.
    #[inline]
    pub fn with_status_opt(mut self, status: Option<i32>) -> Self {
        self.status = status;
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a connect cycle number.
    #[inline]
    pub fn with_cycle(mut self, n: u64) -> Self {
        self.cycle = Some(n);
        self
    }

    /// Attaches a register generation.
    #[inline]
    pub fn with_generation(mut self, n: u64) -> Self {
        self.generation = Some(n);
        self
    }

    /// Attaches a reset cause.
    #[inline]
    pub fn with_cause(mut self, cause: ResetCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
