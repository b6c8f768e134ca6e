//! Phases of the connection supervisor.
//!
//! ```text
//!            ┌──────────────────────────────────────────────────────┐
//!            ▼                                                      │
//!   AwaitingLink ──► ConnectingCloud ──► AwaitingReady ──► Ready    │
//!                                             │              │      │
//!                                       Timeout│    Disconnect│      │
//!                                             ▼              ▼      │
//!                                         Resetting(cause) ─────────┘
//! ```

use std::fmt;

/// Why the supervisor entered [`Phase::Resetting`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResetCause {
    /// The session did not become ready in time, or disconnected during the handshake.
    Timeout,
    /// A ready session was lost.
    Disconnect,
}

impl ResetCause {
    /// Stable lowercase label.
    pub fn as_label(self) -> &'static str {
        match self {
            ResetCause::Timeout => "timeout",
            ResetCause::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for ResetCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Supervisor state. There is no terminal phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting, without limit, for the link to register.
    AwaitingLink,
    /// Issuing the connect request and waiting (advisory) for the transport session.
    ConnectingCloud,
    /// Waiting for readiness or an early disconnect.
    AwaitingReady,
    /// Session usable; waiting, without limit, for a disconnect.
    Ready,
    /// Tearing down and clearing the cloud register.
    Resetting(ResetCause),
}
