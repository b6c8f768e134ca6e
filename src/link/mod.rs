//! Link layer: the cellular collaborator boundary and its monitor.
//!
//! The link stack is external. It is started once through [`Link::start`] and then
//! reports [`LinkEvent`]s to the [`LinkMonitor`] from its own callback context.
//!
//! ```text
//! modem stack ── LinkEvent ──► LinkMonitor::handle ── post/reset ──► link register
//! ```

mod monitor;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LinkError;

pub use monitor::LinkMonitor;

/// Shared handle to a link collaborator.
pub type LinkRef = Arc<dyn Link>;

/// Network registration status reported by the modem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Not registered and not searching.
    NotRegistered,
    /// Registered on the home network.
    RegisteredHome,
    /// Searching for a network.
    Searching,
    /// Registration denied by the network.
    RegistrationDenied,
    /// Status unknown (e.g. out of coverage).
    Unknown,
    /// Registered on a roaming network.
    RegisteredRoaming,
    /// SIM failure.
    UiccFail,
}

impl RegistrationStatus {
    /// True for the two statuses that give a usable link.
    pub fn is_registered(self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming
        )
    }

    /// Stable kebab-case label.
    pub fn as_label(self) -> &'static str {
        match self {
            RegistrationStatus::NotRegistered => "not-registered",
            RegistrationStatus::RegisteredHome => "registered-home",
            RegistrationStatus::Searching => "searching",
            RegistrationStatus::RegistrationDenied => "registration-denied",
            RegistrationStatus::Unknown => "unknown",
            RegistrationStatus::RegisteredRoaming => "registered-roaming",
            RegistrationStatus::UiccFail => "uicc-fail",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Radio resource control mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RrcMode {
    /// Radio connection active.
    Connected,
    /// Radio idle.
    Idle,
}

/// Notification from the link stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// Network registration status changed.
    Registration(RegistrationStatus),
    /// RRC mode changed. Log-only.
    RrcMode(RrcMode),
    /// Any other modem notification. Ignored.
    Other,
}

/// # External link (modem) collaborator.
///
/// `start` initializes the link library and begins an asynchronous attach. From then on
/// the implementation must forward its notifications to `monitor.handle(..)`; it may do
/// so from any thread.
///
/// An error from `start` is an initialization failure: the supervisor stops for good.
#[async_trait]
pub trait Link: Send + Sync + 'static {
    /// Initializes the link library and starts connecting.
    async fn start(&self, monitor: LinkMonitor) -> Result<(), LinkError>;
}
