//! Cloud layer: the transport collaborator boundary and its event mapper.
//!
//! The transport owns the handshake, framing and delivery. The coordinator only
//! asks it to connect, disconnect and send, and learns about session progress
//! through [`TransportEvent`]s delivered to the [`CloudEventMapper`].
//!
//! ```text
//! transport ── TransportEvent ──► CloudEventMapper::handle ── post ──► cloud register
//!     ▲                                                                   │
//!     └──────── connect / disconnect ◄── ConnectionSupervisor ◄── wait ───┘
//! ```

mod mapper;

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::TransportError;

pub use mapper::CloudEventMapper;

/// Shared handle to a transport collaborator.
pub type TransportRef = Arc<dyn Transport>;

/// Kind of a transport callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Transport session established.
    TransportConnected,
    /// Connection in progress.
    TransportConnecting,
    /// Backend asks for a one-time user association.
    AssociationRequest,
    /// User association completed.
    UserAssociated,
    /// Session authenticated and usable.
    Ready,
    /// Session ended.
    TransportDisconnected,
    /// Connect attempt reported an error.
    TransportConnectError,
    /// Generic transport error.
    Error,
    /// Backend acknowledged published data.
    DataAck,
    /// Device shadow delta received.
    ShadowReceived,
    /// Any kind the mapper does not know, with the raw discriminant.
    Other(i32),
}

/// One transport callback, optionally with a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportEvent {
    /// What happened.
    pub kind: TransportEventKind,
    /// Library status code, if the transport supplied one.
    pub status: Option<i32>,
}

impl TransportEvent {
    /// Creates an event without a status code.
    pub fn new(kind: TransportEventKind) -> Self {
        Self { kind, status: None }
    }

    /// Attaches a status code.
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<TransportEventKind> for TransportEvent {
    fn from(kind: TransportEventKind) -> Self {
        Self::new(kind)
    }
}

/// A single sensor reading ready for the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleMessage {
    /// Backend application id of the reading (e.g. `"TEMP"`).
    pub app_id: &'static str,
    /// Reading value.
    pub value: f64,
    /// Wall-clock timestamp; `None` while the time is unknown.
    pub at: Option<SystemTime>,
}

/// Messages the data-producing task hands to the transport.
#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    /// One-shot "device now online" alert.
    DeviceOnline,
    /// A timestamped sensor sample.
    Sample(SampleMessage),
}

/// # External cloud transport collaborator.
///
/// `init` is called once before any other method; afterwards the implementation must
/// deliver every callback to `mapper.handle(..)`. The mapper never blocks, so it is safe
/// to call from the transport's own thread or callback context.
///
/// `disconnect` returns [`TransportError::NotConnected`] when there is no session;
/// callers treat that as success.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Initializes the transport library.
    async fn init(&self, mapper: CloudEventMapper) -> Result<(), TransportError>;

    /// Requests a connection to the backend. Progress arrives as events.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Requests the session be torn down.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Queues an outbound message.
    async fn send(&self, msg: Outbound) -> Result<(), TransportError>;
}
