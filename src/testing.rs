//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::cloud::{CloudEventMapper, Outbound, Transport, TransportEvent, TransportEventKind};
use crate::error::{LinkError, SensorError, TransportError};
use crate::events::{Event, EventKind};
use crate::link::{Link, LinkEvent, LinkMonitor, RegistrationStatus};
use crate::telemetry::{Sample, Sensor};

/// Receives until an event of `kind` arrives. Lagged receivers keep going.
pub(crate) async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == kind => return ev,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => panic!("bus closed while waiting for {kind:?}"),
        }
    }
}

/// Receives events until `kind` arrives and returns every kind seen, including it.
pub(crate) async fn kinds_until(
    rx: &mut broadcast::Receiver<Event>,
    kind: EventKind,
) -> Vec<EventKind> {
    let mut seen = Vec::new();
    loop {
        match rx.recv().await {
            Ok(ev) => {
                seen.push(ev.kind);
                if ev.kind == kind {
                    return seen;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => panic!("bus closed while waiting for {kind:?}"),
        }
    }
}

pub(crate) struct FakeLink {
    monitor: OnceLock<LinkMonitor>,
    on_start: Option<RegistrationStatus>,
    fail: Option<LinkError>,
}

impl FakeLink {
    /// Registers on the home network as soon as it is started.
    pub(crate) fn registered() -> Self {
        Self {
            monitor: OnceLock::new(),
            on_start: Some(RegistrationStatus::RegisteredHome),
            fail: None,
        }
    }

    /// Starts without reporting any status.
    pub(crate) fn detached() -> Self {
        Self {
            on_start: None,
            ..Self::registered()
        }
    }

    pub(crate) fn failing(err: LinkError) -> Self {
        Self {
            fail: Some(err),
            ..Self::detached()
        }
    }

    pub(crate) fn report(&self, status: RegistrationStatus) {
        self.monitor
            .get()
            .expect("link not started")
            .handle(LinkEvent::Registration(status));
    }
}

#[async_trait]
impl Link for FakeLink {
    async fn start(&self, monitor: LinkMonitor) -> Result<(), LinkError> {
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        let monitor = self.monitor.get_or_init(|| monitor);
        if let Some(status) = self.on_start {
            monitor.handle(LinkEvent::Registration(status));
        }
        Ok(())
    }
}

/// Transport that replays one script of events per connect request.
pub(crate) struct FakeTransport {
    mapper: OnceLock<CloudEventMapper>,
    init_result: Result<(), TransportError>,
    connect_result: Mutex<Result<(), TransportError>>,
    disconnect_result: Mutex<Result<(), TransportError>>,
    send_result: Mutex<Result<(), TransportError>>,
    scripts: Mutex<VecDeque<Vec<TransportEvent>>>,
    initialized: AtomicBool,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    sent: Mutex<Vec<Outbound>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            mapper: OnceLock::new(),
            init_result: Ok(()),
            connect_result: Mutex::new(Ok(())),
            disconnect_result: Mutex::new(Ok(())),
            send_result: Mutex::new(Ok(())),
            scripts: Mutex::new(VecDeque::new()),
            initialized: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queues the events delivered on the next unscripted connect request.
    pub(crate) fn script(self, events: &[TransportEventKind]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .push_back(events.iter().copied().map(TransportEvent::new).collect());
        self
    }

    pub(crate) fn failing_init(mut self, err: TransportError) -> Self {
        self.init_result = Err(err);
        self
    }

    pub(crate) fn set_connect_result(&self, res: Result<(), TransportError>) {
        *self.connect_result.lock().unwrap() = res;
    }

    pub(crate) fn set_disconnect_result(&self, res: Result<(), TransportError>) {
        *self.disconnect_result.lock().unwrap() = res;
    }

    pub(crate) fn set_send_result(&self, res: Result<(), TransportError>) {
        *self.send_result.lock().unwrap() = res;
    }

    /// Delivers an event out of band, as the transport thread would.
    pub(crate) fn inject(&self, kind: TransportEventKind) {
        self.mapper
            .get()
            .expect("transport not initialized")
            .handle(kind);
    }

    pub(crate) fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn init(&self, mapper: CloudEventMapper) -> Result<(), TransportError> {
        self.init_result.clone()?;
        let _ = self.mapper.set(mapper);
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn connect(&self) -> Result<(), TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        if let Some(mapper) = self.mapper.get() {
            for ev in script {
                mapper.handle(ev);
            }
        }
        self.connect_result.lock().unwrap().clone()
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.disconnect_result.lock().unwrap().clone()
    }

    async fn send(&self, msg: Outbound) -> Result<(), TransportError> {
        self.send_result.lock().unwrap().clone()?;
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

/// Sensor returning queued readings, then a constant.
pub(crate) struct FakeSensor {
    readings: Mutex<VecDeque<Result<f64, SensorError>>>,
    fallback: f64,
    reads: AtomicUsize,
}

impl FakeSensor {
    pub(crate) fn constant(value: f64) -> Self {
        Self {
            readings: Mutex::new(VecDeque::new()),
            fallback: value,
            reads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn then(self, reading: Result<f64, SensorError>) -> Self {
        self.readings.lock().unwrap().push_back(reading);
        self
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sensor for FakeSensor {
    async fn read(&self) -> Result<Sample, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let next = self.readings.lock().unwrap().pop_front();
        let value = next.unwrap_or(Ok(self.fallback))?;
        Ok(Sample::new("TEMP", value))
    }
}
