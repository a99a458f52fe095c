//! # Termination report.
//!
//! One [`Outcome`] per registered resource, in the order the resources were
//! closed (reverse registration order), aggregated into a
//! [`TerminationReport`] together with the triggering [`Signal`].
//!
//! The report is assembled by the sequencer alone and only published once
//! complete, so readers never observe a partial report.

use std::fmt;
use std::time::Duration;

use crate::error::CloseError;
use crate::signals::Signal;

/// Result status of closing one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseStatus {
    /// The close operation reported success before its deadline.
    Success,
    /// The close operation failed, panicked or exceeded its deadline.
    Failed,
}

impl CloseStatus {
    /// Returns `"SUCCESS"` or `"FAILED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseStatus::Success => "SUCCESS",
            CloseStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for CloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded result of closing a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Resource name as registered.
    pub name: String,
    /// Final status.
    pub status: CloseStatus,
    /// Failure detail; `None` on success.
    pub error: Option<CloseError>,
    /// Time from dispatch until the outcome was recorded.
    pub elapsed: Duration,
}

impl Outcome {
    pub(crate) fn from_result(
        name: impl Into<String>,
        result: Result<(), CloseError>,
        elapsed: Duration,
    ) -> Self {
        let (status, error) = match result {
            Ok(()) => (CloseStatus::Success, None),
            Err(e) => (CloseStatus::Failed, Some(e)),
        };
        Self {
            name: name.into(),
            status,
            error,
            elapsed,
        }
    }

    /// True if the resource closed successfully.
    pub fn is_success(&self) -> bool {
        self.status == CloseStatus::Success
    }

    /// True if the resource exceeded its deadline.
    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(CloseError::is_timeout)
    }
}

/// Aggregate result of one shutdown sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationReport {
    /// Trigger that started the sequence.
    pub signal: Signal,
    /// Number of outcomes that are not [`CloseStatus::Success`].
    pub failed_or_timeout_count: usize,
    /// Outcomes in close order (last registered first).
    pub outcomes: Vec<Outcome>,
}

impl TerminationReport {
    pub(crate) fn new(signal: Signal, capacity: usize) -> Self {
        Self {
            signal,
            failed_or_timeout_count: 0,
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        if !outcome.is_success() {
            self.failed_or_timeout_count += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Iterates over outcomes that did not succeed.
    pub fn failed(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// True if every resource closed successfully.
    pub fn is_clean(&self) -> bool {
        self.failed_or_timeout_count == 0
    }

    /// Resource names in close order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_non_success_outcomes() {
        let mut report = TerminationReport::new(Signal::Interrupt, 3);
        report.record(Outcome::from_result("a", Ok(()), Duration::ZERO));
        report.record(Outcome::from_result(
            "b",
            Err(CloseError::Timeout {
                timeout: Duration::from_millis(10),
            }),
            Duration::from_millis(10),
        ));
        report.record(Outcome::from_result(
            "c",
            Err(CloseError::failed("nope")),
            Duration::ZERO,
        ));

        assert_eq!(report.failed_or_timeout_count, 2);
        assert_eq!(report.failed().count(), 2);
        assert!(!report.is_clean());
        assert!(report.outcomes[1].is_timeout());
        assert!(!report.outcomes[2].is_timeout());
        assert_eq!(report.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn status_renders_uppercase() {
        assert_eq!(CloseStatus::Success.to_string(), "SUCCESS");
        assert_eq!(CloseStatus::Failed.to_string(), "FAILED");
    }
}
