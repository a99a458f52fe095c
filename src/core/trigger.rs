//! # Programmatic trigger source.
//!
//! [`TriggerHandle`] feeds the monitor's subscription: a bounded channel of
//! capacity 1. OS listeners deliver through the same handle, so programmatic
//! and OS triggers share one first-wins path.

use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::signals::Signal;

/// Cloneable handle that delivers a trigger to a terminator's monitor.
#[derive(Clone, Debug)]
pub struct TriggerHandle {
    tx: mpsc::Sender<Signal>,
    bus: Bus,
}

impl TriggerHandle {
    pub(crate) fn new(tx: mpsc::Sender<Signal>, bus: Bus) -> Self {
        Self { tx, bus }
    }

    /// Delivers `signal` to the monitor.
    ///
    /// Returns `true` if the subscription accepted it. Returns `false` if
    /// another trigger is already pending or the monitor has unsubscribed.
    /// A trigger accepted in the short window between the monitor starting
    /// the sequence and releasing its subscription is dropped unprocessed.
    pub fn fire(&self, signal: Signal) -> bool {
        let (why, signal) = match self.tx.try_send(signal) {
            Ok(()) => return true,
            Err(mpsc::error::TrySendError::Full(s)) => ("pending", s),
            Err(mpsc::error::TrySendError::Closed(s)) => ("unsubscribed", s),
        };
        tracing::debug!(signal = %signal, reason = why, "trigger ignored");
        self.bus.publish(
            Event::new(EventKind::TriggerIgnored)
                .with_signal(signal)
                .with_reason(why),
        );
        false
    }

    /// True once the monitor has released its subscription.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
