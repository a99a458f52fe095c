//! # LogWriter - tracing-backed event writer
//!
//! A subscriber that renders incoming [`Event`]s as `tracing` records.
//! Install any `tracing` subscriber in the host process to see them.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO termvisor: trigger received signal=SIGTERM resources=3
//! DEBUG termvisor: closing resource=db position=1 deadline_ms=Some(500)
//! WARN termvisor: deadline exceeded resource=db deadline_ms=Some(500)
//! WARN termvisor: close failed resource=db reason=timed out after 500ms
//! INFO termvisor: closed resource=cache elapsed_ms=Some(12)
//! INFO termvisor: shutdown sequence completed signal=SIGTERM failed=1
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "termvisor";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let resource = e.resource.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let signal = e.signal.as_ref().map(|s| s.as_str()).unwrap_or("-");

        match e.kind {
            EventKind::TriggerReceived => {
                info!(target: TARGET, signal, resources = ?e.position, "trigger received");
            }
            EventKind::TriggerIgnored => {
                debug!(target: TARGET, signal, reason, "trigger ignored");
            }
            EventKind::ResourceRegistered => {
                debug!(target: TARGET, resource, position = ?e.position, deadline_ms = ?e.deadline_ms, "registered");
            }
            EventKind::RegistrationRejected => {
                warn!(target: TARGET, resource, "registration rejected");
            }
            EventKind::ResourceClosing => {
                debug!(target: TARGET, resource, position = ?e.position, deadline_ms = ?e.deadline_ms, "closing");
            }
            EventKind::ResourceClosed => {
                info!(target: TARGET, resource, elapsed_ms = ?e.elapsed_ms, "closed");
            }
            EventKind::ResourceFailed => {
                warn!(target: TARGET, resource, reason, elapsed_ms = ?e.elapsed_ms, "close failed");
            }
            EventKind::DeadlineHit => {
                warn!(target: TARGET, resource, deadline_ms = ?e.deadline_ms, "deadline exceeded");
            }
            EventKind::SequenceCompleted => {
                info!(target: TARGET, signal, failed = ?e.position, elapsed_ms = ?e.elapsed_ms, "shutdown sequence completed");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: TARGET, subscriber = resource, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: TARGET, subscriber = resource, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
