//! # Link monitor.
//!
//! Maps link notifications onto the link register:
//! - registered (home or roaming) → `post(Connected)`, once per transition
//! - any other registration status → `reset()` of the link register
//! - RRC mode → log-only
//!
//! No retries happen here; the link stack owns attach retries and the supervisor owns
//! the wait.

use crate::events::{Bus, Event, EventKind};
use crate::register::{EventRegister, LinkSignal, LinkState};

use super::{LinkEvent, RrcMode};

const COMPONENT: &str = "link";

/// Reactive sink for link notifications. Cheap to clone; never blocks.
#[derive(Clone, Debug)]
pub struct LinkMonitor {
    link: EventRegister<LinkState>,
    bus: Bus,
}

impl LinkMonitor {
    /// Creates a monitor writing into `link` and publishing to `bus`.
    pub fn new(link: EventRegister<LinkState>, bus: Bus) -> Self {
        Self { link, bus }
    }

    /// Handles one notification from the link stack.
    pub fn handle(&self, event: LinkEvent) {
        match event {
            LinkEvent::Registration(status) => {
                let was_connected = self.link.is_set(LinkSignal::Connected);

                if status.is_registered() {
                    if !was_connected {
                        self.link.post(LinkSignal::Connected);
                        self.publish(EventKind::LinkConnected, status.as_label());
                    }
                } else {
                    self.link.reset();
                    if was_connected {
                        self.publish(EventKind::LinkLost, status.as_label());
                    }
                }
            }
            LinkEvent::RrcMode(mode) => {
                let mode = match mode {
                    RrcMode::Connected => "connected",
                    RrcMode::Idle => "idle",
                };
                self.publish(EventKind::RrcModeChanged, mode);
            }
            LinkEvent::Other => {}
        }
    }

    /// True while the link is registered.
    pub fn is_connected(&self) -> bool {
        self.link.is_set(LinkSignal::Connected)
    }

    fn publish(&self, kind: EventKind, reason: &'static str) {
        self.bus
            .publish(Event::new(kind).with_task(COMPONENT).with_reason(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RegistrationStatus::{self, *};
    use tokio::sync::broadcast::error::TryRecvError;

    fn monitor() -> (LinkMonitor, EventRegister<LinkState>, Bus) {
        let link = EventRegister::new();
        let bus = Bus::new(64);
        (LinkMonitor::new(link.clone(), bus.clone()), link, bus)
    }

    #[test]
    fn reflects_most_recent_status() {
        let sequences: [&[RegistrationStatus]; 5] = [
            &[RegisteredHome],
            &[RegisteredHome, Searching],
            &[Searching, RegisteredRoaming],
            &[RegisteredRoaming, RegisteredHome, UiccFail, Unknown],
            &[NotRegistered, RegistrationDenied, RegisteredHome, RegisteredRoaming],
        ];

        for seq in sequences {
            let (mon, link, _bus) = monitor();
            for status in seq {
                mon.handle(LinkEvent::Registration(*status));
            }
            let last = seq.last().copied().unwrap();
            assert_eq!(
                link.is_set(LinkSignal::Connected),
                last.is_registered(),
                "sequence {seq:?}"
            );
            assert_eq!(mon.is_connected(), last.is_registered());
        }
    }

    #[tokio::test]
    async fn publishes_only_on_transitions() {
        let (mon, _link, bus) = monitor();
        let mut rx = bus.subscribe();

        mon.handle(LinkEvent::Registration(RegisteredHome));
        mon.handle(LinkEvent::Registration(RegisteredRoaming));
        mon.handle(LinkEvent::Registration(Searching));
        mon.handle(LinkEvent::Registration(Unknown));

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::LinkConnected);
        let lost = rx.try_recv().unwrap();
        assert_eq!(lost.kind, EventKind::LinkLost);
        assert_eq!(lost.reason.as_deref(), Some("searching"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn rrc_and_other_events_leave_state_alone() {
        let (mon, link, _bus) = monitor();
        mon.handle(LinkEvent::Registration(RegisteredHome));
        mon.handle(LinkEvent::RrcMode(RrcMode::Idle));
        mon.handle(LinkEvent::Other);
        assert!(link.is_set(LinkSignal::Connected));
        assert_eq!(link.generation(), 0);
    }
}
