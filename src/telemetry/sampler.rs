//! # Sampler task.
//!
//! ```text
//! await_connection(forever) ─► send DeviceOnline ─► await_time_known(date_time_timeout)
//!                                                        │ (timeout → TimeUnknown, continue)
//!                                                        ▼
//!                                  ┌──► tick(sample_interval) ─► read sensor ─► send Sample
//!                                  └────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Readiness gates only the first sample. Later reconnect cycles are not awaited;
//!   sends while disconnected fail at the transport and are reported as `SampleFailed`.
//! - Read and send failures never stop the loop.
//! - Samples carry a timestamp only once wall-clock time is known.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cloud::{Outbound, SampleMessage, TransportRef};
use crate::config::Config;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::readiness::ReadinessGate;
use crate::tasks::Task;

use super::SensorRef;

const NAME: &str = "sampler";

/// `interval` panics on a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic sensor sampling gated on first cloud readiness.
pub struct Sampler {
    gate: ReadinessGate,
    transport: TransportRef,
    sensor: SensorRef,
    bus: Bus,
    date_time_timeout: Duration,
    sample_interval: Duration,
}

impl Sampler {
    /// Creates a sampler using the timing settings of `cfg`.
    pub fn new(
        cfg: &Config,
        gate: ReadinessGate,
        transport: TransportRef,
        sensor: SensorRef,
        bus: Bus,
    ) -> Self {
        Self {
            gate,
            transport,
            sensor,
            bus,
            date_time_timeout: cfg.date_time_timeout,
            sample_interval: cfg.sample_interval.max(MIN_INTERVAL),
        }
    }

    async fn announce_online(&self) {
        match self.transport.send(Outbound::DeviceOnline).await {
            Ok(()) => self.publish(Event::new(EventKind::DeviceOnline)),
            Err(e) => self.publish(
                Event::new(EventKind::SampleFailed)
                    .with_reason(format!("device online alert: {e}"))
                    .with_status_opt(e.code()),
            ),
        }
    }

    async fn sample_once(&self) {
        let sample = match self.sensor.read().await {
            Ok(sample) => sample,
            Err(e) => {
                self.publish(Event::new(EventKind::SampleFailed).with_reason(e.to_string()));
                return;
            }
        };

        let msg = SampleMessage {
            app_id: sample.app_id,
            value: sample.value,
            at: self.gate.is_time_known().then(SystemTime::now),
        };
        match self.transport.send(Outbound::Sample(msg)).await {
            Ok(()) => self.publish(Event::new(EventKind::SampleSent).with_reason(sample.app_id)),
            Err(e) => self.publish(
                Event::new(EventKind::SampleFailed)
                    .with_reason(e.to_string())
                    .with_status_opt(e.code()),
            ),
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_task(NAME));
    }
}

#[async_trait]
impl Task for Sampler {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        tokio::select! {
            _ = ctx.cancelled() => return Ok(()),
            _ = self.gate.await_connection(None) => {}
        }
        self.announce_online().await;

        let time_known = tokio::select! {
            _ = ctx.cancelled() => return Ok(()),
            known = self.gate.await_time_known(Some(self.date_time_timeout)) => known,
        };
        if !time_known {
            self.publish(Event::new(EventKind::TimeUnknown).with_timeout(self.date_time_timeout));
        }

        let mut ticker = time::interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }
            self.sample_once().await;
        }
    }
}
