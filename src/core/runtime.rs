//! # Runtime: owns the shared context and runs the tasks.
//!
//! The [`Runtime`] owns the event bus, the subscriber fan-out, the [`Registers`] and the
//! configuration. It hands them to the tasks it builds, runs every task once, handles OS
//! signals and enforces a graceful-shutdown grace period.
//!
//! ## Architecture
//! ```text
//! Runtime::new(cfg, subscribers)
//!   ├─ Bus::new(cfg.bus_capacity)
//!   ├─ Registers::new()             (link, cloud, clock)
//!   └─ listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Runtime::run(tasks) / run_until(tasks, shutdown)
//!   tasks[0] .. tasks[N-1] ──► run_task(task, runtime_token.child_token())  (JoinSet)
//!
//! Exit paths:
//!   all tasks returned             → Ok(())
//!   shutdown signal / future       → ShutdownRequested → cancel → wait grace
//!                                      ├─ all joined → AllStoppedWithin, Ok(())
//!                                      └─ timeout    → GraceExceeded, Err(GraceExceeded)
//!   a task died (TaskError::Fatal) → cancel → wait grace → Err(Fatal)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use linkvisor::{Config, LogWriter, Runtime, Subscribe, TaskRef};
//! # use linkvisor::{LinkRef, TransportRef, SensorRef};
//! # async fn demo(link: LinkRef, transport: TransportRef, sensor: SensorRef) -> Result<(), linkvisor::RuntimeError> {
//! let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//! let rt = Runtime::new(Config::default(), subs);
//!
//! let tasks: Vec<TaskRef> = vec![
//!     Arc::new(rt.connection(link, transport.clone())),
//!     Arc::new(rt.sampler(transport, sensor)),
//! ];
//! rt.run(tasks).await
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cloud::TransportRef;
use crate::config::Config;
use crate::core::{
    alive::AliveTracker,
    connection::ConnectionSupervisor,
    runner::{run_task, TaskExit},
    shutdown,
};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::link::LinkRef;
use crate::readiness::ReadinessGate;
use crate::register::Registers;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRef;
use crate::telemetry::{Sampler, SensorRef};

/// Shared context plus task orchestration and graceful shutdown.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    registers: Registers,
    alive: Arc<AliveTracker>,
}

impl Runtime {
    /// Creates a runtime and starts delivering bus events to `subscribers`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        Self::subscriber_listener(&bus, subs);

        Self {
            cfg,
            bus,
            registers: Registers::new(),
            alive: Arc::new(AliveTracker::new()),
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus shared with every component.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Registers of this runtime. The external time source calls
    /// [`Registers::mark_time_known`] on them.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Readiness gate over this runtime's registers.
    pub fn gate(&self) -> ReadinessGate {
        ReadinessGate::new(&self.registers)
    }

    /// Builds the connection supervisor wired to this runtime.
    pub fn connection(&self, link: LinkRef, transport: TransportRef) -> ConnectionSupervisor {
        ConnectionSupervisor::new(
            self.cfg.clone(),
            link,
            transport,
            self.registers.clone(),
            self.bus.clone(),
        )
    }

    /// Builds the sampler wired to this runtime.
    pub fn sampler(&self, transport: TransportRef, sensor: SensorRef) -> Sampler {
        Sampler::new(&self.cfg, self.gate(), transport, sensor, self.bus.clone())
    }

    /// Runs `tasks` until they all return, one dies, or a termination signal arrives.
    ///
    /// If the signal handlers cannot be installed, shutdown starts immediately.
    pub async fn run(&self, tasks: Vec<TaskRef>) -> Result<(), RuntimeError> {
        let signal = async {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(name) => Some(name.to_string()),
                Err(e) => Some(format!("signal handlers unavailable: {e}")),
            }
        };
        self.run_with(tasks, signal).await
    }

    /// Like [`run`](Self::run), but shutdown starts when `shutdown` completes.
    pub async fn run_until<F>(&self, tasks: Vec<TaskRef>, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        self.run_with(tasks, async {
            shutdown.await;
            None
        })
        .await
    }

    async fn run_with<F>(&self, tasks: Vec<TaskRef>, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = Option<String>> + Send,
    {
        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        for task in tasks {
            set.spawn(run_task(
                task,
                token.child_token(),
                self.bus.clone(),
                Arc::clone(&self.alive),
            ));
        }
        self.drive_shutdown(&mut set, &token, shutdown).await
    }

    /// Forwards bus events to the subscriber set (fire-and-forget).
    fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    async fn drive_shutdown<F>(
        &self,
        set: &mut JoinSet<TaskExit>,
        runtime_token: &CancellationToken,
        shutdown: F,
    ) -> Result<(), RuntimeError>
    where
        F: Future<Output = Option<String>> + Send,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                reason = &mut shutdown => {
                    let mut ev = Event::new(EventKind::ShutdownRequested);
                    if let Some(reason) = reason {
                        ev = ev.with_reason(reason);
                    }
                    self.bus.publish(ev);
                    runtime_token.cancel();
                    return self.wait_all_with_grace(set).await;
                }
                joined = set.join_next() => match joined {
                    None => return Ok(()),
                    Some(Ok(TaskExit::Dead { task, reason })) => {
                        runtime_token.cancel();
                        let _ = self.wait_all_with_grace(set).await;
                        return Err(RuntimeError::Fatal { task, reason });
                    }
                    Some(_) => continue,
                },
            }
        }
    }

    /// Waits for all tasks to finish within the configured grace period.
    async fn wait_all_with_grace(&self, set: &mut JoinSet<TaskExit>) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async { while set.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let stuck = self.alive.snapshot().await;
                self.bus
                    .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")));
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::cloud::{Outbound, TransportEventKind::*};
    use crate::error::{LinkError, TaskError};
    use crate::tasks::Task;
    use crate::testing::{kinds_until, next_of, FakeLink, FakeSensor, FakeTransport};

    struct UntilCancelled;

    #[async_trait]
    impl Task for UntilCancelled {
        fn name(&self) -> &str {
            "until-cancelled"
        }

        async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        }
    }

    struct Stubborn;

    #[async_trait]
    impl Task for Stubborn {
        fn name(&self) -> &str {
            "stubborn"
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    struct Flaky;

    #[async_trait]
    impl Task for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
            Err(TaskError::Fail {
                reason: "sensor bus".into(),
            })
        }
    }

    fn runtime(grace: Duration) -> Runtime {
        let cfg = Config {
            grace,
            ..Config::default()
        };
        Runtime::new(cfg, Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_within_grace() {
        let rt = runtime(Duration::from_secs(1));
        let mut rx = rt.bus().subscribe();
        let tasks: Vec<TaskRef> = vec![Arc::new(UntilCancelled), Arc::new(Flaky)];

        let res = rt
            .run_until(tasks, tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(res.is_ok());

        let failed = next_of(&mut rx, EventKind::TaskFailed).await;
        assert_eq!(failed.task.as_deref(), Some("flaky"));
        let seen = kinds_until(&mut rx, EventKind::AllStoppedWithin).await;
        assert!(seen.contains(&EventKind::ShutdownRequested));
        assert!(seen.contains(&EventKind::TaskStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn grace_exceeded_names_stuck_tasks() {
        let rt = runtime(Duration::from_secs(2));
        let tasks: Vec<TaskRef> = vec![Arc::new(Stubborn), Arc::new(UntilCancelled)];

        let err = rt
            .run_until(tasks, tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap_err();
        match err {
            RuntimeError::GraceExceeded { grace, stuck } => {
                assert_eq!(grace, Duration::from_secs(2));
                assert_eq!(stuck, vec!["stubborn".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_when_all_tasks_finish() {
        let rt = runtime(Duration::from_secs(1));
        let tasks: Vec<TaskRef> = vec![Arc::new(Flaky)];
        let res = rt.run_until(tasks, std::future::pending::<()>()).await;
        assert!(res.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_stops_the_runtime() {
        let rt = runtime(Duration::from_secs(1));
        let mut rx = rt.bus().subscribe();
        let transport = Arc::new(FakeTransport::new());
        let link = Arc::new(FakeLink::failing(LinkError::Configure { code: -8 }));

        let tasks: Vec<TaskRef> = vec![
            Arc::new(rt.connection(link, transport.clone())),
            Arc::new(rt.sampler(transport, Arc::new(FakeSensor::constant(1.0)))),
        ];
        let err = rt
            .run_until(tasks, std::future::pending::<()>())
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "runtime_fatal");
        match err {
            RuntimeError::Fatal { task, reason } => {
                assert_eq!(task, "connection");
                assert!(reason.contains("code -8"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        let dead = next_of(&mut rx, EventKind::TaskDead).await;
        assert_eq!(dead.task.as_deref(), Some("connection"));
    }

    #[tokio::test(start_paused = true)]
    async fn connects_and_samples_end_to_end() {
        let rt = runtime(Duration::from_secs(5));
        let mut rx = rt.bus().subscribe();
        let transport = Arc::new(
            FakeTransport::new().script(&[TransportConnecting, TransportConnected, Ready]),
        );
        let link = Arc::new(FakeLink::registered());
        let sensor = Arc::new(FakeSensor::constant(19.25));
        rt.registers().mark_time_known();

        let tasks: Vec<TaskRef> = vec![
            Arc::new(rt.connection(link, transport.clone())),
            Arc::new(rt.sampler(transport.clone(), sensor.clone())),
        ];
        let res = rt
            .run_until(tasks, tokio::time::sleep(Duration::from_secs(95)))
            .await;
        assert!(res.is_ok());

        next_of(&mut rx, EventKind::ConnectionReady).await;
        let sent = transport.sent();
        assert_eq!(sent.first(), Some(&Outbound::DeviceOnline));
        // Ticks at 0s, 30s, 60s and 90s.
        assert_eq!(sent.len(), 1 + 4);
        assert_eq!(sensor.reads(), 4);
    }
}
