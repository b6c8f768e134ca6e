//! # LogWriter - renders events through `tracing`
//!
//! Levels follow the error taxonomy:
//! - `error`: initialization failures and dead tasks (needs restart/redeploy)
//! - `warn`: transient failures that the reset cycle recovers from
//! - `info`: normal lifecycle progression
//! - `debug`: log-only callbacks
//!
//! ## Example output
//! ```text
//! INFO waiting for link cycle=1
//! INFO link registered component="link" status="registered-home"
//! WARN connect attempt failed cycle=1 reason="ready timeout" timeout_ms=60000
//! INFO resetting cloud connection cycle=1 cause=Timeout settle_ms=20000
//! ERROR collaborator failed to initialize component="link" reason="modem library initialization failed (code -5)"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::SubscriberPanicked => {
                error!(subscriber = component, info = reason, "subscriber panicked")
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = component, reason, "subscriber dropped event")
            }
            EventKind::ShutdownRequested => info!(reason, "shutdown requested"),
            EventKind::AllStoppedWithin => info!("all tasks stopped within grace"),
            EventKind::GraceExceeded => warn!(stuck = reason, "shutdown grace exceeded"),
            EventKind::TaskStarting => debug!(task = component, "task starting"),
            EventKind::TaskStopped => debug!(task = component, "task stopped"),
            EventKind::TaskFailed => warn!(task = component, reason, "task failed"),
            EventKind::TaskDead => error!(task = component, reason, "task died, restart required"),

            EventKind::LinkConnected => info!(component, status = reason, "link registered"),
            EventKind::LinkLost => info!(component, status = reason, "link not registered"),
            EventKind::RrcModeChanged => debug!(component, mode = reason, "rrc mode"),

            EventKind::TransportConnecting => debug!("transport connecting"),
            EventKind::TransportConnected => info!("transport connected"),
            EventKind::AssociationRequested => {
                info!("association requested; add the device to the cloud account to complete it")
            }
            EventKind::UserAssociated => info!(reason, "user associated"),
            EventKind::CloudReady => info!("cloud ready"),
            EventKind::DisconnectSignaled => info!(reason, "cloud disconnect signalled"),
            EventKind::TransportConnectError => {
                warn!(status = ?e.status, "transport connect error")
            }
            EventKind::TransportError => warn!(status = ?e.status, "transport error"),
            EventKind::TransportNotice => debug!(notice = reason, "transport notice"),
            EventKind::UnknownTransportEvent => {
                warn!(kind = ?e.status, "unknown transport event")
            }

            EventKind::InitFailed => error!(
                component,
                reason,
                status = ?e.status,
                "collaborator failed to initialize"
            ),
            EventKind::AwaitingLink => info!(cycle = ?e.cycle, "waiting for link"),
            EventKind::LinkAvailable => info!(cycle = ?e.cycle, "link available"),
            EventKind::CloudConnectRequested => info!(cycle = ?e.cycle, "connecting to cloud"),
            EventKind::CloudConnectRequestFailed => warn!(
                cycle = ?e.cycle,
                reason,
                status = ?e.status,
                "connect request failed; waiting for readiness anyway"
            ),
            EventKind::CloudConnectTimeout => info!(
                cycle = ?e.cycle,
                timeout_ms = ?e.timeout_ms,
                "no transport session yet"
            ),
            EventKind::AwaitingReady => info!(
                cycle = ?e.cycle,
                timeout_ms = ?e.timeout_ms,
                "waiting for cloud readiness"
            ),
            EventKind::ConnectionReady => {
                info!(cycle = ?e.cycle, generation = ?e.generation, "connected to cloud")
            }
            EventKind::ConnectAttemptFailed => warn!(
                cycle = ?e.cycle,
                reason,
                timeout_ms = ?e.timeout_ms,
                "connect attempt failed"
            ),
            EventKind::ConnectionLost => info!(cycle = ?e.cycle, "disconnected from cloud"),
            EventKind::ResetStarted => info!(
                cycle = ?e.cycle,
                cause = ?e.cause,
                settle_ms = ?e.delay_ms,
                "resetting cloud connection"
            ),
            EventKind::TeardownComplete => info!(cycle = ?e.cycle, reason, "teardown complete"),
            EventKind::TeardownFailed => warn!(
                cycle = ?e.cycle,
                reason,
                status = ?e.status,
                "disconnect failed; continuing anyway"
            ),
            EventKind::RegisterCleared => {
                debug!(cycle = ?e.cycle, generation = ?e.generation, "cloud register cleared")
            }
            EventKind::ReestablishScheduled => {
                info!(cycle = ?e.cycle, delay_ms = ?e.delay_ms, "next attempt scheduled")
            }

            EventKind::DeviceOnline => info!("device online"),
            EventKind::TimeUnknown => warn!(
                timeout_ms = ?e.timeout_ms,
                "date and time not determined; proceeding anyway"
            ),
            EventKind::SampleSent => debug!(app_id = reason, "sample sent"),
            EventKind::SampleFailed => warn!(reason, status = ?e.status, "sample failed"),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
