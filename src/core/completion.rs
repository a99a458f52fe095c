//! # One-shot completion gate.
//!
//! A [`CancellationToken`] used as a close-once broadcast: any number of
//! waiters, arriving before or after completion, observe the same outcome.
//! The report is stored before the gate opens, so a released waiter always
//! finds it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::report::TerminationReport;

#[derive(Default)]
pub(crate) struct Completion {
    done: CancellationToken,
    report: OnceLock<Arc<TerminationReport>>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the report and opens the gate. Later calls are ignored.
    pub fn complete(&self, report: Arc<TerminationReport>) {
        if self.report.set(report).is_err() {
            tracing::warn!("completion gate already open; report discarded");
            return;
        }
        self.done.cancel();
    }

    pub fn is_completed(&self) -> bool {
        self.done.is_cancelled()
    }

    pub fn report(&self) -> Option<Arc<TerminationReport>> {
        if self.is_completed() {
            self.report.get().cloned()
        } else {
            None
        }
    }

    /// Waits for the gate or `timeout`, whichever first.
    pub async fn wait(&self, timeout: Duration) -> Option<Arc<TerminationReport>> {
        if !self.is_completed() {
            time::timeout(timeout, self.done.cancelled()).await.ok()?;
        }
        self.report.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_while_closed() {
        let gate = Completion::new();
        assert!(gate.wait(Duration::from_secs(3)).await.is_none());
        assert!(gate.report().is_none());
    }

    #[tokio::test]
    async fn all_waiters_released_and_later_ones_return_immediately() {
        let gate = Arc::new(Completion::new());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let g = gate.clone();
            waiters.push(tokio::spawn(async move {
                g.wait(Duration::from_secs(5)).await.is_some()
            }));
        }

        gate.complete(Arc::new(TerminationReport::new(Signal::Interrupt, 0)));
        for w in waiters {
            assert!(w.await.unwrap());
        }
        assert!(gate.wait(Duration::ZERO).await.is_some());
        assert!(gate.is_completed());
    }

    #[tokio::test]
    async fn second_completion_keeps_first_report() {
        let gate = Completion::new();
        gate.complete(Arc::new(TerminationReport::new(Signal::Interrupt, 0)));
        gate.complete(Arc::new(TerminationReport::new(Signal::Terminate, 0)));
        assert_eq!(gate.report().unwrap().signal, Signal::Interrupt);
    }
}
