//! # Cloud event mapper.
//!
//! Turns transport callbacks into cloud register updates. Runs synchronously in the
//! transport's callback context: no I/O, no waiting, no failure mode of its own.
//!
//! | Transport event        | Register effect                                  |
//! |------------------------|--------------------------------------------------|
//! | transport-connected    | `post(Connected)`                                |
//! | association-request    | `post(AssociationRequest)`                       |
//! | user-associated        | `post(Disconnected)` if an association is pending |
//! | ready                  | `post(Ready)`                                    |
//! | transport-disconnected | `post(Disconnected)`                             |
//! | everything else        | none (published for logging)                     |

use crate::events::{Bus, Event, EventKind};
use crate::register::{CloudSignal, CloudState, EventRegister};

use super::{TransportEvent, TransportEventKind};

const COMPONENT: &str = "cloud";

/// Reactive sink for transport callbacks. Cheap to clone.
#[derive(Clone, Debug)]
pub struct CloudEventMapper {
    cloud: EventRegister<CloudState>,
    bus: Bus,
}

impl CloudEventMapper {
    /// Creates a mapper writing into `cloud` and publishing to `bus`.
    pub fn new(cloud: EventRegister<CloudState>, bus: Bus) -> Self {
        Self { cloud, bus }
    }

    /// Handles one transport callback.
    pub fn handle(&self, event: impl Into<TransportEvent>) {
        let TransportEvent { kind, status } = event.into();

        match kind {
            TransportEventKind::TransportConnected => {
                self.cloud.post(CloudSignal::Connected);
                self.publish(Event::new(EventKind::TransportConnected));
            }
            TransportEventKind::TransportConnecting => {
                self.publish(Event::new(EventKind::TransportConnecting));
            }
            TransportEventKind::AssociationRequest => {
                self.cloud.post(CloudSignal::AssociationRequest);
                self.publish(Event::new(EventKind::AssociationRequested));
            }
            TransportEventKind::UserAssociated => self.user_associated(),
            TransportEventKind::Ready => {
                self.cloud.post(CloudSignal::Ready);
                self.publish(Event::new(EventKind::CloudReady));
            }
            TransportEventKind::TransportDisconnected => {
                self.cloud.post(CloudSignal::Disconnected);
                self.publish(
                    Event::new(EventKind::DisconnectSignaled).with_reason("transport disconnected"),
                );
            }
            TransportEventKind::TransportConnectError => {
                self.publish(Event::new(EventKind::TransportConnectError).with_status_opt(status));
            }
            TransportEventKind::Error => {
                self.publish(Event::new(EventKind::TransportError).with_status_opt(status));
            }
            TransportEventKind::DataAck => {
                self.publish(Event::new(EventKind::TransportNotice).with_reason("data ack"));
            }
            TransportEventKind::ShadowReceived => {
                self.publish(Event::new(EventKind::TransportNotice).with_reason("shadow received"));
            }
            TransportEventKind::Other(raw) => {
                self.publish(Event::new(EventKind::UnknownTransportEvent).with_status(raw));
            }
        }
    }

    /// A completed association forces a reconnect under the new identity.
    fn user_associated(&self) {
        let state = self.cloud.snapshot();
        if !state.association_requested() {
            self.publish(Event::new(EventKind::UserAssociated).with_reason("no association pending"));
            return;
        }

        self.publish(Event::new(EventKind::UserAssociated).with_reason("pending"));
        if !state.disconnected() {
            self.cloud.post(CloudSignal::Disconnected);
            self.publish(Event::new(EventKind::DisconnectSignaled).with_reason("user associated"));
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_task(COMPONENT));
    }
}
