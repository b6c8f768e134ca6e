//! # Typed event register with blocking waits.
//!
//! [`EventRegister`] holds one [`RegisterState`] plus a generation counter behind a
//! [`tokio::sync::watch`] channel. Posting merges a signal into the state, resetting
//! replaces the state with its default and starts a new generation.
//!
//! ## Architecture
//! ```text
//! callback contexts ── post(signal) ──┐
//! supervisor ───────── reset() ───────┼──► watch::Sender<Snapshot<S>>
//!                                     │           │ (notify all receivers)
//!                                     │           ▼
//! waiters ── wait_any / wait_all / wait_until ◄── watch::Receiver::wait_for(pred)
//! ```
//!
//! ## Rules
//! - `post` only ever adds facts; `reset` is the only way facts disappear.
//! - `post` and `reset` are synchronous and never block; safe from any thread.
//! - Waiters re-evaluate their predicate on every change, so one `post` may satisfy many waiters.
//! - A reset that lands before a waiter observes a post hides that post (new generation).
//!
//! ## Timeouts
//! `timeout: Option<Duration>`:
//! - `None` → wait forever
//! - `Some(Duration::ZERO)` → non-blocking poll of the current state
//! - `Some(d)` → wait up to `d`

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::watch, time};

/// State held by an [`EventRegister`].
///
/// The state is a typed view over a set of signals. `Default` is the state right
/// after a reset.
pub trait RegisterState: Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Signals that can be posted to this register.
    type Signal: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// Merges `signal` into the state. Must never remove a previously set signal.
    fn apply(&mut self, signal: Self::Signal);

    /// Returns true if `signal` is observable in this state.
    fn is_set(&self, signal: Self::Signal) -> bool;
}

#[derive(Clone, Debug, Default)]
struct Snapshot<S> {
    generation: u64,
    state: S,
}

/// Shared, cloneable handle to one event register.
///
/// Clones observe and mutate the same register.
pub struct EventRegister<S: RegisterState> {
    tx: Arc<watch::Sender<Snapshot<S>>>,
}

impl<S: RegisterState> Clone for EventRegister<S> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<S: RegisterState> fmt::Debug for EventRegister<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.tx.borrow();
        f.debug_struct("EventRegister")
            .field("generation", &snap.generation)
            .field("state", &snap.state)
            .finish()
    }
}

impl<S: RegisterState> Default for EventRegister<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RegisterState> EventRegister<S> {
    /// Creates a register in generation 0 with the default state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Merges `signal` into the register and wakes every waiter.
    pub fn post(&self, signal: S::Signal) {
        self.tx.send_modify(|snap| snap.state.apply(signal));
    }

    /// Clears the register and starts a new generation. Returns the new generation.
    ///
    /// Waiters are woken but keep waiting unless their condition holds for the empty state.
    pub fn reset(&self) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|snap| {
            snap.generation = snap.generation.wrapping_add(1);
            snap.state = S::default();
            generation = snap.generation;
        });
        generation
    }

    /// Non-blocking check of a single signal.
    pub fn is_set(&self, signal: S::Signal) -> bool {
        self.tx.borrow().state.is_set(signal)
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> S {
        self.tx.borrow().state.clone()
    }

    /// Returns the current generation (number of resets so far).
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Waits until at least one of `signals` is set. Returns false on timeout.
    pub async fn wait_any(&self, signals: &[S::Signal], timeout: Option<Duration>) -> bool {
        self.wait_until(|s| signals.iter().any(|sig| s.is_set(*sig)), timeout)
            .await
            .is_some()
    }

    /// Waits until all of `signals` are set. Returns false on timeout.
    pub async fn wait_all(&self, signals: &[S::Signal], timeout: Option<Duration>) -> bool {
        self.wait_until(|s| signals.iter().all(|sig| s.is_set(*sig)), timeout)
            .await
            .is_some()
    }

    /// Waits until `pred` holds and returns the state that satisfied it, or `None` on timeout.
    pub async fn wait_until<F>(&self, mut pred: F, timeout: Option<Duration>) -> Option<S>
    where
        F: FnMut(&S) -> bool + Send,
    {
        let mut rx = self.tx.subscribe();

        match timeout {
            Some(d) if d.is_zero() => {
                let snap = rx.borrow();
                let polled = pred(&snap.state).then(|| snap.state.clone());
                polled
            }
            Some(d) => time::timeout(d, Self::satisfied(&mut rx, pred))
                .await
                .ok()
                .flatten(),
            None => Self::satisfied(&mut rx, pred).await,
        }
    }

    async fn satisfied<F>(rx: &mut watch::Receiver<Snapshot<S>>, mut pred: F) -> Option<S>
    where
        F: FnMut(&S) -> bool + Send,
    {
        // The sender lives as long as `self`, so `wait_for` only fails if the register is gone.
        rx.wait_for(|snap| pred(&snap.state))
            .await
            .ok()
            .map(|snap| snap.state.clone())
    }
}
