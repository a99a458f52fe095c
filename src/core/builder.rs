use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    completion::Completion,
    config::Config,
    monitor::{self, Shared},
    registry::Registry,
    terminator::Terminator,
    trigger::TriggerHandle,
};
use crate::{
    error::TerminatorError,
    events::{Bus, Event, EventKind},
    signals,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Terminator`] with optional subscribers.
pub struct TerminatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TerminatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with
    /// bounded queues; they are detached after `SequenceCompleted`.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the terminator and arms its monitor.
    ///
    /// Subscribes every configured OS signal first; if any subscription fails,
    /// listeners installed so far are released and the error is returned.
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Terminator, TerminatorError> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_subscriber_listener(bus.subscribe(), set);
        }

        let (tx, rx) = mpsc::channel::<signals::Signal>(1);
        let trigger = TriggerHandle::new(tx, bus.clone());
        let unsubscribe = CancellationToken::new();

        let mut subscribed = Vec::new();
        for sig in self.cfg.unique_signals() {
            match signals::subscribe(&sig, trigger.clone(), unsubscribe.clone()) {
                Ok(true) => subscribed.push(sig),
                Ok(false) => {}
                Err(e) => {
                    unsubscribe.cancel();
                    return Err(e);
                }
            }
        }
        debug!(signals = ?subscribed, "terminator armed");

        let shared = Arc::new(Shared {
            registry: Registry::new(bus.clone()),
            completion: Completion::new(),
            bus,
        });
        tokio::spawn(monitor::run(rx, unsubscribe, Arc::clone(&shared)));

        Ok(Terminator {
            shared,
            trigger,
            subscribed: subscribed.into(),
        })
    }
}

/// Forwards bus events to the subscriber set until the sequence completes.
fn spawn_subscriber_listener(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let last = ev.kind == EventKind::SequenceCompleted;
                    set.emit(Arc::new(ev));
                    if last {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber listener lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}
