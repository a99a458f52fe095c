//! # Trigger monitor.
//!
//! One background task per terminator. It blocks on the subscription until
//! the first trigger arrives, then drives the shutdown sequence exactly once:
//!
//! ```text
//! rx.recv() ──► Signal
//!   ├─► unsubscribe (close rx, cancel OS listeners)
//!   ├─► registry.seal()            → (resources, callback)
//!   ├─► publish TriggerReceived
//!   ├─► sequencer::close_all()     → TerminationReport
//!   ├─► callback(&report)          (if set)
//!   └─► completion.complete(report) → all waiters released
//! ```
//!
//! A panic inside the callback is not contained: the monitor task ends and
//! the completion gate never opens.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::completion::Completion;
use crate::core::registry::Registry;
use crate::core::sequencer;
use crate::events::{Bus, Event, EventKind};
use crate::signals::Signal;

/// State shared between the terminator handle and its monitor.
pub(crate) struct Shared {
    pub registry: Registry,
    pub completion: Completion,
    pub bus: Bus,
}

pub(crate) async fn run(
    mut rx: mpsc::Receiver<Signal>,
    unsubscribe: CancellationToken,
    shared: Arc<Shared>,
) {
    let Some(signal) = rx.recv().await else {
        debug!("all trigger sources dropped; monitor exiting without shutdown");
        unsubscribe.cancel();
        return;
    };

    rx.close();
    unsubscribe.cancel();
    drop(rx);

    let Some(sealed) = shared.registry.seal() else {
        return;
    };
    info!(signal = %signal, resources = sealed.resources.len(), "termination triggered");
    shared.bus.publish(
        Event::new(EventKind::TriggerReceived)
            .with_signal(signal.clone())
            .with_position(sealed.resources.len()),
    );

    let report = sequencer::close_all(&signal, sealed.resources, &shared.bus).await;
    info!(
        signal = %signal,
        failed = report.failed_or_timeout_count,
        closed = report.outcomes.len(),
        "shutdown sequence finished"
    );

    if let Some(callback) = sealed.callback {
        callback(&report);
    }
    shared.completion.complete(Arc::new(report));
}
