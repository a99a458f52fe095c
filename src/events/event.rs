//! # Runtime events emitted by the terminator.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Trigger events**: a trigger was accepted or ignored
//! - **Registration events**: a resource was registered or rejected
//! - **Sequence events**: per-resource close flow and sequence completion
//! - **Subscriber events**: fan-out overflow and panics
//!
//! The [`Event`] struct carries additional metadata such as timestamps, resource
//! name, signal, reasons, deadlines and elapsed time.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use termvisor::{Event, EventKind, Signal};
//!
//! let ev = Event::new(EventKind::DeadlineHit)
//!     .with_resource("db")
//!     .with_signal(Signal::Terminate)
//!     .with_deadline(Duration::from_millis(500));
//!
//! assert_eq!(ev.kind, EventKind::DeadlineHit);
//! assert_eq!(ev.resource.as_deref(), Some("db"));
//! assert_eq!(ev.deadline_ms, Some(500));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::signals::Signal;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `resource`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `resource`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Trigger events ===
    /// The monitor accepted a trigger; the registry is sealed and the sequence begins.
    ///
    /// Sets:
    /// - `signal`: triggering identity
    /// - `position`: number of resources about to be closed
    TriggerReceived,

    /// A trigger arrived after the first one (or after unsubscribe) and was dropped.
    ///
    /// Sets:
    /// - `signal`: ignored identity
    /// - `reason`: "pending" or "unsubscribed"
    TriggerIgnored,

    // === Registration events ===
    /// A resource was appended to the registry.
    ///
    /// Sets:
    /// - `resource`: resource name
    /// - `deadline_ms`: configured deadline, if any
    /// - `position`: 1-based registration index
    ResourceRegistered,

    /// A registration arrived after the registry was sealed.
    ///
    /// Sets:
    /// - `resource`: resource name
    RegistrationRejected,

    // === Sequence events ===
    /// A resource's close operation was dispatched.
    ///
    /// Sets:
    /// - `resource`: resource name
    /// - `signal`: triggering identity
    /// - `deadline_ms`: configured deadline, if any
    /// - `position`: 1-based close index
    ResourceClosing,

    /// A resource closed successfully.
    ///
    /// Sets:
    /// - `resource`, `signal`, `position`
    /// - `elapsed_ms`: time spent closing
    ResourceClosed,

    /// A resource failed to close (error, timeout or panic).
    ///
    /// Sets:
    /// - `resource`, `signal`, `position`
    /// - `reason`: failure message
    /// - `elapsed_ms`: time spent before the outcome was recorded
    ResourceFailed,

    /// A resource exceeded its deadline; always followed by `ResourceFailed`.
    ///
    /// Sets:
    /// - `resource`, `signal`, `position`
    /// - `deadline_ms`: the exceeded deadline
    DeadlineHit,

    /// Every resource has an outcome; the report is final.
    ///
    /// Sets:
    /// - `signal`: triggering identity
    /// - `position`: number of failed-or-timed-out resources
    /// - `elapsed_ms`: total sequence duration
    SequenceCompleted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the resource (or subscriber), if applicable.
    pub resource: Option<Arc<str>>,
    /// Triggering signal, if applicable.
    pub signal: Option<Signal>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Per-resource deadline in milliseconds (compact).
    pub deadline_ms: Option<u32>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Index or count, see the individual [`EventKind`] docs.
    pub position: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            resource: None,
            signal: None,
            reason: None,
            deadline_ms: None,
            elapsed_ms: None,
            position: None,
        }
    }

    /// Attaches a resource name.
    #[inline]
    pub fn with_resource(mut self, name: impl Into<Arc<str>>) -> Self {
        self.resource = Some(name.into());
        self
    }

    /// Attaches the triggering signal.
    #[inline]
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an index or count.
    #[inline]
    pub fn with_position(mut self, n: usize) -> Self {
        self.position = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_resource(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_resource(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
