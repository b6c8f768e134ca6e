//! # Register states for the link, cloud and clock registers.
//!
//! Each state is a tagged view over the signals of one subsystem:
//! - [`LinkState`]: a single fact, the link is registered on a network.
//! - [`CloudState`]: the transport [`Session`] progression plus two independent facts
//!   (association pending, disconnected).
//! - [`ClockState`]: wall-clock time is known. Never reset.
//!
//! ## Cloud session progression
//! ```text
//! Idle ──Connected──► Connected ──Ready──► Ready
//!   └──────────────────Ready──────────────────┘
//! ```
//! `Ready` implies `Connected`; posting `Connected` never downgrades `Ready`.

use super::register::RegisterState;

/// Signals of the link register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkSignal {
    /// The link is registered (home or roaming).
    Connected,
}

/// Link layer state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkState {
    connected: bool,
}

impl LinkState {
    /// True when the link is registered on a network.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl RegisterState for LinkState {
    type Signal = LinkSignal;

    fn apply(&mut self, signal: LinkSignal) {
        match signal {
            LinkSignal::Connected => self.connected = true,
        }
    }

    fn is_set(&self, signal: LinkSignal) -> bool {
        match signal {
            LinkSignal::Connected => self.connected,
        }
    }
}

/// Signals of the cloud register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudSignal {
    /// Transport session established.
    Connected,
    /// The backend asked for a one-time user association.
    AssociationRequest,
    /// Session authenticated and usable for data.
    Ready,
    /// Session ended (error, explicit disconnect or association completed).
    Disconnected,
}

/// Progression of one transport session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Session {
    /// No session in this generation.
    #[default]
    Idle,
    /// Transport session established, not yet usable.
    Connected,
    /// Session authenticated and usable.
    Ready,
}

/// Cloud layer state for the current generation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudState {
    session: Session,
    association_requested: bool,
    disconnected: bool,
}

impl CloudState {
    /// Current session progression.
    pub fn session(&self) -> Session {
        self.session
    }

    /// True when the session reached `Ready` and no disconnect has been signalled.
    pub fn is_usable(&self) -> bool {
        self.session == Session::Ready && !self.disconnected
    }

    /// True when the association request is pending.
    pub fn association_requested(&self) -> bool {
        self.association_requested
    }

    /// True once a disconnect was signalled in this generation.
    pub fn disconnected(&self) -> bool {
        self.disconnected
    }
}

impl RegisterState for CloudState {
    type Signal = CloudSignal;

    fn apply(&mut self, signal: CloudSignal) {
        match signal {
            CloudSignal::Connected => self.session = self.session.max(Session::Connected),
            CloudSignal::Ready => self.session = Session::Ready,
            CloudSignal::AssociationRequest => self.association_requested = true,
            CloudSignal::Disconnected => self.disconnected = true,
        }
    }

    fn is_set(&self, signal: CloudSignal) -> bool {
        match signal {
            CloudSignal::Connected => self.session >= Session::Connected,
            CloudSignal::Ready => self.session == Session::Ready,
            CloudSignal::AssociationRequest => self.association_requested,
            CloudSignal::Disconnected => self.disconnected,
        }
    }
}

/// Signals of the clock register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSignal {
    /// Wall-clock date and time have been acquired.
    TimeKnown,
}

/// Wall-clock knowledge. Monotone: nothing resets it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockState {
    time_known: bool,
}

impl RegisterState for ClockState {
    type Signal = ClockSignal;

    fn apply(&mut self, signal: ClockSignal) {
        match signal {
            ClockSignal::TimeKnown => self.time_known = true,
        }
    }

    fn is_set(&self, signal: ClockSignal) -> bool {
        match signal {
            ClockSignal::TimeKnown => self.time_known,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_implies_connected() {
        let mut s = CloudState::default();
        s.apply(CloudSignal::Ready);
        assert!(s.is_set(CloudSignal::Connected));
        assert!(s.is_set(CloudSignal::Ready));
        assert!(s.is_usable());
    }

    #[test]
    fn connected_never_downgrades_ready() {
        let mut s = CloudState::default();
        s.apply(CloudSignal::Ready);
        s.apply(CloudSignal::Connected);
        assert_eq!(s.session(), Session::Ready);
    }

    #[test]
    fn disconnect_makes_ready_unusable() {
        let mut s = CloudState::default();
        s.apply(CloudSignal::Connected);
        s.apply(CloudSignal::Ready);
        s.apply(CloudSignal::Disconnected);
        assert!(s.is_set(CloudSignal::Ready));
        assert!(!s.is_usable());
    }

    #[test]
    fn default_states_are_empty() {
        let cloud = CloudState::default();
        for sig in [
            CloudSignal::Connected,
            CloudSignal::AssociationRequest,
            CloudSignal::Ready,
            CloudSignal::Disconnected,
        ] {
            assert!(!cloud.is_set(sig));
        }
        assert!(!LinkState::default().is_set(LinkSignal::Connected));
        assert!(!ClockState::default().is_set(ClockSignal::TimeKnown));
    }
}
