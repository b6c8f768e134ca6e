//! # Example: simulated
//!
//! Runs the connection supervisor and the sampler against an in-process modem,
//! transport and temperature sensor, with short timings so a full cycle fits in a minute.
//!
//! The simulated transport never reaches readiness on its first attempt (ready timeout,
//! reset) and drops every ready session after 20 seconds (disconnect, reset).
//!
//! ## Flow
//! ```text
//! SimLink ── registered-home after 2s ──► LinkMonitor
//! SimTransport::connect ── connecting, connected, (ready after 1s) ──► CloudEventMapper
//! ConnectionSupervisor ── AwaitingLink → ConnectingCloud → AwaitingReady → Ready → Resetting
//! Sampler ── DeviceOnline, then a sample every 5s
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example simulated
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use linkvisor::{
    CloudEventMapper, Config, Link, LinkError, LinkEvent, LinkMonitor, LogWriter, Outbound,
    RegistrationStatus, Runtime, Sample, Sensor, SensorError, Subscribe, TaskRef, Transport,
    TransportError, TransportEventKind,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct SimLink;

#[async_trait]
impl Link for SimLink {
    async fn start(&self, monitor: LinkMonitor) -> Result<(), LinkError> {
        tokio::spawn(async move {
            monitor.handle(LinkEvent::Registration(RegistrationStatus::Searching));
            tokio::time::sleep(Duration::from_secs(2)).await;
            monitor.handle(LinkEvent::Registration(RegistrationStatus::RegisteredHome));
        });
        Ok(())
    }
}

#[derive(Default)]
struct SimTransport {
    mapper: OnceLock<CloudEventMapper>,
    attempts: AtomicU32,
}

impl SimTransport {
    fn mapper(&self) -> Result<CloudEventMapper, TransportError> {
        self.mapper.get().cloned().ok_or(TransportError::NotConnected)
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn init(&self, mapper: CloudEventMapper) -> Result<(), TransportError> {
        self.mapper
            .set(mapper)
            .map_err(|_| TransportError::Init { code: -114 })
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let mapper = self.mapper()?;
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            mapper.handle(TransportEventKind::TransportConnecting);
            tokio::time::sleep(Duration::from_millis(500)).await;
            mapper.handle(TransportEventKind::TransportConnected);
            if attempt == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
            mapper.handle(TransportEventKind::Ready);
            tokio::time::sleep(Duration::from_secs(20)).await;
            mapper.handle(TransportEventKind::TransportDisconnected);
        });
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Err(TransportError::NotConnected)
    }

    async fn send(&self, msg: Outbound) -> Result<(), TransportError> {
        println!(" ─► sent {msg:?}");
        Ok(())
    }
}

#[derive(Default)]
struct SimSensor {
    reads: AtomicU32,
}

#[async_trait]
impl Sensor for SimSensor {
    async fn read(&self) -> Result<Sample, SensorError> {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        if n % 7 == 6 {
            return Err(SensorError::Read {
                reason: "i2c nack".into(),
            });
        }
        Ok(Sample::new("TEMP", 20.0 + f64::from(n % 5) * 0.25))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::default().add_directive("info".parse()?)),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(fmt::format().compact().with_target(false)),
        )
        .init();

    let cfg = Config {
        connect_timeout: Duration::from_secs(3),
        ready_timeout: Duration::from_secs(5),
        reestablish_delay: Duration::from_secs(3),
        settle_delay: Duration::from_secs(1),
        date_time_timeout: Duration::from_secs(10),
        sample_interval: Duration::from_secs(5),
        ..Config::default()
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let rt = Runtime::new(cfg, subs);

    // Wall-clock time arrives from the network a little after boot.
    let registers = rt.registers().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        registers.mark_time_known();
    });

    let transport = Arc::new(SimTransport::default());
    let tasks: Vec<TaskRef> = vec![
        Arc::new(rt.connection(Arc::new(SimLink), transport.clone())),
        Arc::new(rt.sampler(transport, Arc::new(SimSensor::default()))),
    ];

    rt.run(tasks).await?;
    Ok(())
}
