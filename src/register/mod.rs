//! Event registers: the only shared mutable state between tasks.
//!
//! ## Contents
//! - [`EventRegister`] generic register with `post`/`reset` and blocking waits
//! - [`LinkState`], [`CloudState`], [`ClockState`] typed states per subsystem
//! - [`Registers`] the bundle handed to every component at construction
//!
//! ## Who writes what
//! ```text
//! LinkMonitor ─────── post/reset ──► link  ◄── wait ── ConnectionSupervisor
//! CloudEventMapper ── post ────────► cloud ◄── wait ── ConnectionSupervisor, ReadinessGate
//! ConnectionSupervisor ── reset ───► cloud
//! time source ─────── post ────────► clock ◄── wait ── ReadinessGate
//! ```

mod register;
mod state;

pub use register::{EventRegister, RegisterState};
pub use state::{
    ClockSignal, ClockState, CloudSignal, CloudState, LinkSignal, LinkState, Session,
};

/// The three registers of one runtime instance.
///
/// Cheap to clone; clones share the same registers. Tests build one per case.
#[derive(Clone, Debug, Default)]
pub struct Registers {
    /// Link layer state, driven by the [`LinkMonitor`](crate::LinkMonitor).
    pub link: EventRegister<LinkState>,
    /// Cloud layer state, driven by the [`CloudEventMapper`](crate::CloudEventMapper)
    /// and reset by the supervisor.
    pub cloud: EventRegister<CloudState>,
    /// Wall-clock knowledge, set once by the external time source.
    pub clock: EventRegister<ClockState>,
}

impl Registers {
    /// Creates a fresh set of empty registers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that wall-clock time has been acquired. Idempotent.
    pub fn mark_time_known(&self) {
        self.clock.post(ClockSignal::TimeKnown);
    }
}
