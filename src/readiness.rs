//! # Readiness gate.
//!
//! Read-only view over the cloud and clock registers for data-producing tasks.
//! Nothing here mutates state; every method is a query or a wait.
//!
//! ```text
//! Sampler ── await_connection ──► cloud register (Ready)
//!         ── await_time_known ──► clock register (TimeKnown)
//! ```

use std::time::Duration;

use crate::register::{ClockSignal, ClockState, CloudSignal, CloudState, EventRegister, Registers};

/// Observational handle over connection readiness. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ReadinessGate {
    cloud: EventRegister<CloudState>,
    clock: EventRegister<ClockState>,
}

impl ReadinessGate {
    /// Creates a gate over the given registers.
    pub fn new(registers: &Registers) -> Self {
        Self {
            cloud: registers.cloud.clone(),
            clock: registers.clock.clone(),
        }
    }

    /// True once a transport session exists in the current generation.
    pub fn is_connected(&self) -> bool {
        self.cloud.is_set(CloudSignal::Connected)
    }

    /// Waits until the session is ready. `None` waits forever; zero polls.
    ///
    /// A disconnect does not end this wait; the next generation may still become ready.
    pub async fn await_connection(&self, timeout: Option<Duration>) -> bool {
        self.cloud.wait_any(&[CloudSignal::Ready], timeout).await
    }

    /// Waits until a disconnect has been signalled in the current generation.
    pub async fn await_disconnection(&self, timeout: Option<Duration>) -> bool {
        self.cloud.wait_any(&[CloudSignal::Disconnected], timeout).await
    }

    /// True once a disconnect has been signalled in the current generation.
    pub fn is_disconnecting(&self) -> bool {
        self.cloud.is_set(CloudSignal::Disconnected)
    }

    /// Waits until wall-clock time is known.
    pub async fn await_time_known(&self, timeout: Option<Duration>) -> bool {
        self.clock.wait_any(&[ClockSignal::TimeKnown], timeout).await
    }

    /// True once wall-clock time is known.
    pub fn is_time_known(&self) -> bool {
        self.clock.is_set(ClockSignal::TimeKnown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn ready_returns_immediately_until_reset() {
        let regs = Registers::new();
        let gate = ReadinessGate::new(&regs);
        regs.cloud.post(CloudSignal::Ready);

        let start = Instant::now();
        assert!(gate.await_connection(Some(Duration::from_secs(5))).await);
        assert!(gate.await_connection(Some(Duration::ZERO)).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(gate.is_connected());

        regs.cloud.reset();
        assert!(!gate.await_connection(Some(Duration::from_secs(5))).await);
        assert!(!gate.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_wakes_on_post() {
        let regs = Registers::new();
        let gate = ReadinessGate::new(&regs);

        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.await_connection(None).await }
        });
        tokio::time::sleep(Duration::from_secs(3)).await;
        regs.cloud.post(CloudSignal::Connected);
        regs.cloud.post(CloudSignal::Ready);

        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnection_is_observable() {
        let regs = Registers::new();
        let gate = ReadinessGate::new(&regs);
        assert!(!gate.is_disconnecting());
        assert!(!gate.await_disconnection(Some(Duration::from_secs(1))).await);

        regs.cloud.post(CloudSignal::Disconnected);
        assert!(gate.is_disconnecting());
        assert!(gate.await_disconnection(Some(Duration::ZERO)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn time_known_survives_cloud_reset() {
        let regs = Registers::new();
        let gate = ReadinessGate::new(&regs);
        assert!(!gate.await_time_known(Some(Duration::from_secs(30))).await);

        regs.mark_time_known();
        regs.cloud.reset();
        assert!(gate.is_time_known());
        assert!(gate.await_time_known(Some(Duration::ZERO)).await);
    }
}
