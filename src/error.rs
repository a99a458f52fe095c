//! Error types used by the termvisor runtime and close operations.
//!
//! This module defines two main error enums:
//!
//! - [`TerminatorError`] - errors raised by the orchestrator itself (construction, registration).
//! - [`CloseError`] - errors raised by (or on behalf of) individual close operations.
//!
//! Both types provide `as_label` for logging/metrics.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::signals::Signal;

/// # Errors produced by the termvisor runtime.
///
/// None of these are raised during the shutdown sequence itself; a running
/// sequence has no fatal error path.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TerminatorError {
    /// Registration attempted after a trigger was accepted and the registry sealed.
    #[error("registry is sealed; resource {name:?} was rejected")]
    Sealed {
        /// Name of the rejected resource (or `"<callback>"` for observer registration).
        name: Cow<'static, str>,
    },

    /// An observer callback was already installed.
    #[error("termination callback is already set")]
    CallbackAlreadySet,

    /// Subscribing to an OS-level signal failed at construction time.
    #[error("failed to subscribe to {signal}: {source}")]
    Subscribe {
        /// Signal whose listener could not be installed.
        signal: Signal,
        /// Underlying I/O error from the platform.
        #[source]
        source: std::io::Error,
    },
}

impl TerminatorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use termvisor::TerminatorError;
    ///
    /// let err = TerminatorError::Sealed { name: "db".into() };
    /// assert_eq!(err.as_label(), "registry_sealed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TerminatorError::Sealed { .. } => "registry_sealed",
            TerminatorError::CallbackAlreadySet => "callback_already_set",
            TerminatorError::Subscribe { .. } => "signal_subscribe_failed",
        }
    }
}

/// # Errors recorded for a single close operation.
///
/// Close operations return `Result<(), CloseError>`; the sequencer adds
/// [`CloseError::Timeout`] and [`CloseError::Panicked`] on its own.
/// The type is `Clone` so a finished report can be handed to many readers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    /// The resource did not report completion within its deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The close operation reported a failure.
    #[error("close failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The close operation panicked.
    #[error("close panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The close operation observed its context being cancelled and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl CloseError {
    /// Wraps any displayable error as [`CloseError::Failed`].
    ///
    /// # Example
    /// ```
    /// use termvisor::CloseError;
    ///
    /// let err = CloseError::failed("connection reset");
    /// assert_eq!(err.to_string(), "close failed: connection reset");
    /// ```
    pub fn failed(error: impl fmt::Display) -> Self {
        CloseError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CloseError::Timeout { .. } => "close_timeout",
            CloseError::Failed { .. } => "close_failed",
            CloseError::Panicked { .. } => "close_panicked",
            CloseError::Canceled => "close_canceled",
        }
    }

    /// True if the deadline elapsed before the operation reported back.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloseError::Timeout { .. })
    }
}

impl From<std::io::Error> for CloseError {
    fn from(err: std::io::Error) -> Self {
        CloseError::failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            CloseError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .as_label(),
            "close_timeout"
        );
        assert_eq!(CloseError::failed("x").as_label(), "close_failed");
        assert_eq!(CloseError::Canceled.as_label(), "close_canceled");
        assert_eq!(
            TerminatorError::CallbackAlreadySet.as_label(),
            "callback_already_set"
        );
    }

    #[test]
    fn io_errors_become_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe gone");
        let err: CloseError = io.into();
        assert_eq!(
            err,
            CloseError::Failed {
                error: "pipe gone".into()
            }
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn sealed_message_names_resource() {
        let err = TerminatorError::Sealed { name: "cache".into() };
        assert_eq!(
            err.to_string(),
            "registry is sealed; resource \"cache\" was rejected"
        );
    }
}
