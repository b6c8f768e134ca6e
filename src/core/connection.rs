//! # Connection supervisor: the link → cloud → ready → reset cycle.
//!
//! [`ConnectionSupervisor`] initializes both collaborators once, then drives an endless
//! state machine with one transition function per [`Phase`]:
//!
//! ```text
//! init: link.start(LinkMonitor) ─► transport.init(CloudEventMapper)
//!         └─ error ─► InitFailed ─► TaskError::Fatal (no retry)
//!
//! AwaitingLink     wait link Connected (forever)                     ─► ConnectingCloud
//! ConnectingCloud  transport.connect(); wait cloud Connected
//!                  (connect_timeout, advisory; errors logged)        ─► AwaitingReady
//! AwaitingReady    wait Ready | Disconnected (ready_timeout)
//!                    usable Ready                                     ─► Ready
//!                    timeout or disconnect first                      ─► Resetting(Timeout)
//! Ready            wait Disconnected (forever)                       ─► Resetting(Disconnect)
//! Resetting        sleep settle_delay; transport.disconnect()
//!                  (NotConnected = fine, other errors logged);
//!                  cloud.reset(); sleep reestablish_delay             ─► AwaitingLink
//! ```
//!
//! ## Rules
//! - Only initialization failures leave the loop; every other failure funnels into `Resetting`.
//! - The cloud register is reset in exactly one place, so stale signals never cross cycles.
//! - Link loss while `Ready` is only noticed when the transport reports a disconnect.
//! - Cancellation is honoured in every phase.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::cloud::{CloudEventMapper, TransportRef};
use crate::config::Config;
use crate::error::{TaskError, TransportError};
use crate::events::{Bus, Event, EventKind};
use crate::link::{LinkMonitor, LinkRef};
use crate::register::{CloudSignal, LinkSignal, Registers, Session};
use crate::tasks::Task;

use super::phase::{Phase, ResetCause};

const NAME: &str = "connection";

/// Owns the connect/reset cycle. Run it as a [`Task`].
pub struct ConnectionSupervisor {
    cfg: Config,
    link: LinkRef,
    transport: TransportRef,
    registers: Registers,
    bus: Bus,
    cycle: AtomicU64,
}

impl ConnectionSupervisor {
    /// Creates a supervisor over the given collaborators and registers.
    pub fn new(
        cfg: Config,
        link: LinkRef,
        transport: TransportRef,
        registers: Registers,
        bus: Bus,
    ) -> Self {
        Self {
            cfg,
            link,
            transport,
            registers,
            bus,
            cycle: AtomicU64::new(0),
        }
    }

    /// Number of connect cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::Relaxed)
    }

    /// Starts the link and initializes the transport. Failures are fatal.
    async fn init(&self) -> Result<(), TaskError> {
        let monitor = LinkMonitor::new(self.registers.link.clone(), self.bus.clone());
        if let Err(e) = self.link.start(monitor).await {
            self.bus.publish(
                Event::new(EventKind::InitFailed)
                    .with_task("link")
                    .with_reason(e.to_string())
                    .with_status(e.code()),
            );
            return Err(TaskError::Fatal {
                reason: e.to_string(),
            });
        }

        let mapper = CloudEventMapper::new(self.registers.cloud.clone(), self.bus.clone());
        if let Err(e) = self.transport.init(mapper).await {
            self.bus.publish(
                Event::new(EventKind::InitFailed)
                    .with_task("cloud")
                    .with_reason(e.to_string())
                    .with_status_opt(e.code()),
            );
            return Err(TaskError::Fatal {
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    /// Runs the transition out of `phase` and returns the next phase.
    async fn step(&self, phase: Phase) -> Phase {
        match phase {
            Phase::AwaitingLink => self.await_link().await,
            Phase::ConnectingCloud => self.connect_cloud().await,
            Phase::AwaitingReady => self.await_ready().await,
            Phase::Ready => self.hold_ready().await,
            Phase::Resetting(cause) => self.reset(cause).await,
        }
    }

    async fn await_link(&self) -> Phase {
        self.cycle.fetch_add(1, Ordering::Relaxed);
        self.publish(self.event(EventKind::AwaitingLink));

        self.registers
            .link
            .wait_all(&[LinkSignal::Connected], None)
            .await;

        self.publish(self.event(EventKind::LinkAvailable));
        Phase::ConnectingCloud
    }

    async fn connect_cloud(&self) -> Phase {
        self.publish(self.event(EventKind::CloudConnectRequested));

        if let Err(e) = self.transport.connect().await {
            self.publish(
                self.event(EventKind::CloudConnectRequestFailed)
                    .with_reason(e.to_string())
                    .with_status_opt(e.code()),
            );
        }

        let timeout = self.cfg.connect_timeout;
        let connected = self
            .registers
            .cloud
            .wait_any(&[CloudSignal::Connected], Some(timeout))
            .await;
        if !connected {
            self.publish(self.event(EventKind::CloudConnectTimeout).with_timeout(timeout));
        }
        Phase::AwaitingReady
    }

    async fn await_ready(&self) -> Phase {
        let timeout = self.cfg.ready_timeout;
        self.publish(self.event(EventKind::AwaitingReady).with_timeout(timeout));

        let outcome = self
            .registers
            .cloud
            .wait_until(
                |s| s.session() == Session::Ready || s.disconnected(),
                Some(timeout),
            )
            .await;

        let reason = match outcome {
            Some(state) if state.is_usable() => {
                self.publish(
                    self.event(EventKind::ConnectionReady)
                        .with_generation(self.registers.cloud.generation()),
                );
                return Phase::Ready;
            }
            Some(_) => "disconnected before ready",
            None => "ready timeout",
        };
        self.publish(
            self.event(EventKind::ConnectAttemptFailed)
                .with_reason(reason)
                .with_timeout(timeout),
        );
        Phase::Resetting(ResetCause::Timeout)
    }

    async fn hold_ready(&self) -> Phase {
        self.registers
            .cloud
            .wait_all(&[CloudSignal::Disconnected], None)
            .await;

        self.publish(self.event(EventKind::ConnectionLost));
        Phase::Resetting(ResetCause::Disconnect)
    }

    async fn reset(&self, cause: ResetCause) -> Phase {
        let settle = self.cfg.settle_delay;
        self.publish(
            self.event(EventKind::ResetStarted)
                .with_cause(cause)
                .with_delay(settle),
        );
        time::sleep(settle).await;

        match self.transport.disconnect().await {
            Ok(()) => self.publish(self.event(EventKind::TeardownComplete).with_reason("disconnected")),
            Err(TransportError::NotConnected) => {
                self.publish(self.event(EventKind::TeardownComplete).with_reason("not connected"))
            }
            Err(e) => self.publish(
                self.event(EventKind::TeardownFailed)
                    .with_reason(e.to_string())
                    .with_status_opt(e.code()),
            ),
        }

        let generation = self.registers.cloud.reset();
        self.publish(self.event(EventKind::RegisterCleared).with_generation(generation));

        let delay = self.cfg.reestablish_delay;
        self.publish(self.event(EventKind::ReestablishScheduled).with_delay(delay));
        time::sleep(delay).await;

        Phase::AwaitingLink
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_task(NAME).with_cycle(self.cycle())
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}

#[async_trait]
impl Task for ConnectionSupervisor {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        self.init().await?;

        let mut phase = Phase::AwaitingLink;
        loop {
            phase = tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                next = self.step(phase) => next,
            };
        }
    }
}
