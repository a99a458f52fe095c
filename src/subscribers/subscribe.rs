//! # Subscriber trait.
//!
//! Implement [`Subscribe`] to observe the termination runtime: registrations,
//! the accepted trigger, each close and the end of the sequence. Events
//! reach the subscriber through its own bounded queue owned by
//! [`SubscriberSet`](crate::subscribers::SubscriberSet), so a slow
//! `on_event` (network export, batching) holds up neither the shutdown
//! sequence nor other subscribers. When the queue is full the event is
//! dropped for this subscriber.
//!
//! ## Example
//! ```rust
//! use termvisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ResourceFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime [`Event`]s.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &Event);

    /// Identifies the subscriber in overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of the delivery queue; values below 1 are raised to 1.
    fn queue_capacity(&self) -> usize {
        256
    }
}
