//! Error types used by the linkvisor runtime, its tasks and its collaborators.
//!
//! This module defines:
//!
//! - [`RuntimeError`] - errors raised by the task runtime itself.
//! - [`TaskError`] - errors raised by individual task executions.
//! - [`TransportError`] - results of calls into the cloud transport collaborator.
//! - [`LinkError`] - initialization failures of the link (modem) collaborator.
//! - [`SensorError`] - failures reported by the sensor collaborator.
//!
//! All types provide `as_label` for logs; only [`RuntimeError::Fatal`] and
//! [`TaskError::Fatal`] mean "will not self-heal".

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the linkvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tasks remained stuck and had to be force-terminated.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// List of task names that did not shut down in time.
        stuck: Vec<String>,
    },

    /// A task terminated with a non-recoverable error. The process needs a restart or redeploy.
    #[error("task '{task}' died: {reason}")]
    Fatal {
        /// Name of the task that died.
        task: String,
        /// The underlying fatal error message.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use linkvisor::RuntimeError;
    ///
    /// let err = RuntimeError::Fatal { task: "connection".into(), reason: "modem".into() };
    /// assert_eq!(err.as_label(), "runtime_fatal");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Fatal { .. } => "runtime_fatal",
        }
    }
}

/// # Errors produced by task execution.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Non-recoverable error (a collaborator library never initialized).
    #[error("fatal error (no retry): {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },

    /// Task execution failed; it is reported but the runtime keeps going.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// Task was cancelled due to runtime shutdown.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Indicates whether the error needs operator action (restart/redeploy).
    ///
    /// # Example
    /// ```
    /// use linkvisor::TaskError;
    ///
    /// assert!(TaskError::Fatal { reason: "init".into() }.is_fatal());
    /// assert!(!TaskError::Canceled.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::Fatal { .. })
    }
}

/// # Errors reported by the cloud transport collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport has no session to act on (e.g. disconnect while already disconnected).
    #[error("transport is not connected")]
    NotConnected,

    /// The transport library could not be initialized.
    #[error("transport initialization failed (code {code})")]
    Init {
        /// Library status code.
        code: i32,
    },

    /// The transport rejected the request.
    #[error("transport request rejected (code {code})")]
    Rejected {
        /// Library status code.
        code: i32,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::NotConnected => "transport_not_connected",
            TransportError::Init { .. } => "transport_init",
            TransportError::Rejected { .. } => "transport_rejected",
        }
    }

    /// Library status code, if the error carries one.
    pub fn code(&self) -> Option<i32> {
        match self {
            TransportError::NotConnected => None,
            TransportError::Init { code } | TransportError::Rejected { code } => Some(*code),
        }
    }
}

/// # Initialization failures of the link collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The modem library failed to initialize.
    #[error("modem library initialization failed (code {code})")]
    LibraryInit {
        /// Library status code.
        code: i32,
    },

    /// The modem refused the link configuration or the attach request.
    #[error("link could not be configured (code {code})")]
    Configure {
        /// Library status code.
        code: i32,
    },
}

impl LinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkError::LibraryInit { .. } => "link_library_init",
            LinkError::Configure { .. } => "link_configure",
        }
    }

    /// Library status code.
    pub fn code(&self) -> i32 {
        match self {
            LinkError::LibraryInit { code } | LinkError::Configure { code } => *code,
        }
    }
}

/// # Failures reported by the sensor collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor bus or device is not ready.
    #[error("sensor not ready")]
    NotReady,

    /// A read transaction failed.
    #[error("sensor read failed: {reason}")]
    Read {
        /// The underlying error message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            RuntimeError::GraceExceeded {
                grace: Duration::from_secs(1),
                stuck: vec![]
            }
            .as_label(),
            "runtime_grace_exceeded"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(TransportError::NotConnected.as_label(), "transport_not_connected");
        assert_eq!(LinkError::Configure { code: -5 }.as_label(), "link_configure");
    }

    #[test]
    fn transport_codes() {
        assert_eq!(TransportError::NotConnected.code(), None);
        assert_eq!(TransportError::Rejected { code: -13 }.code(), Some(-13));
        assert_eq!(
            TransportError::Init { code: -12 }.to_string(),
            "transport initialization failed (code -12)"
        );
    }

    #[test]
    fn only_fatal_is_fatal() {
        assert!(TaskError::Fatal { reason: "x".into() }.is_fatal());
        assert!(!TaskError::Fail { reason: "x".into() }.is_fatal());
        assert!(!TaskError::Canceled.is_fatal());
    }
}
