//! # Runtime event bus.
//!
//! [`Bus`] wraps a `tokio::sync::broadcast` channel. The registry, the
//! trigger handle, the monitor, the sequencer and subscriber workers all
//! publish into it; the subscriber listener and [`Terminator::events`]
//! receivers read from it.
//!
//! Publishing never blocks and never fails: with no live receiver the event
//! is simply gone. A receiver that falls more than `capacity` events behind
//! gets `RecvError::Lagged` and resumes from the oldest retained event.
//!
//! [`Terminator::events`]: crate::Terminator::events

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publisher handle for runtime events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Receiver for events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
