//! # Terminator: registration API, trigger and completion handle.
//!
//! The [`Terminator`] owns the registry, the trigger subscription and the
//! completion gate. Building one arms a background monitor; the first
//! accepted trigger closes every registered resource, last registered first,
//! and releases all [`wait`](Terminator::wait) callers.
//!
//! ## Lifecycle
//! ```text
//! Terminator::builder(cfg).build()
//!   ├─► subscribe OS signals ──► TriggerHandle ──┐
//!   └─► spawn monitor                            │
//!                                                ▼
//! add()/add_with_timeout()/set_callback()   first trigger
//!                                                │
//!                         seal registry ◄────────┘
//!                         close resources in reverse
//!                         callback(&report)
//!                         open completion gate ──► wait() == true
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use termvisor::{CloseError, Signal, Terminator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let term = Terminator::new([Signal::Interrupt, Signal::Terminate])?;
//!
//!     term.add("db", |_ctx: CancellationToken| async { Ok::<_, CloseError>(()) })?;
//!     term.add_with_timeout(
//!         "http",
//!         |ctx: CancellationToken| async move {
//!             ctx.cancelled().await;
//!             Err(CloseError::Canceled)
//!         },
//!         Duration::from_millis(50),
//!     )?;
//!
//!     // Normally an OS signal does this.
//!     term.trigger(Signal::Terminate);
//!
//!     let report = term.wait_report(Duration::from_secs(1)).await.expect("completed");
//!     assert_eq!(report.names().collect::<Vec<_>>(), ["http", "db"]);
//!     assert_eq!(report.failed_or_timeout_count, 1);
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::core::builder::TerminatorBuilder;
use crate::core::config::Config;
use crate::core::monitor::Shared;
use crate::core::trigger::TriggerHandle;
use crate::error::{CloseError, TerminatorError};
use crate::events::Event;
use crate::report::TerminationReport;
use crate::resources::ResourceSpec;
use crate::signals::Signal;

/// Graceful termination orchestrator.
///
/// Cheap to clone; all clones share one registry and one completion gate.
#[derive(Clone)]
pub struct Terminator {
    pub(crate) shared: Arc<Shared>,
    pub(crate) trigger: TriggerHandle,
    pub(crate) subscribed: Arc<[Signal]>,
}

impl Terminator {
    /// Returns a builder for a terminator with the given configuration.
    pub fn builder(cfg: Config) -> TerminatorBuilder {
        TerminatorBuilder::new(cfg)
    }

    /// Builds a terminator subscribed to `signals`, other settings default.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(signals: impl IntoIterator<Item = Signal>) -> Result<Self, TerminatorError> {
        Self::builder(Config::with_signals(signals)).build()
    }

    /// Registers a resource closed without a deadline.
    ///
    /// Fails only once a trigger has been accepted.
    pub fn add<F, Fut>(
        &self,
        name: impl Into<Cow<'static, str>>,
        close: F,
    ) -> Result<(), TerminatorError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
    {
        self.register(ResourceSpec::from_fn(name, close))
    }

    /// Registers a resource whose close must report back within `deadline`.
    ///
    /// A zero `deadline` is the same as [`add`](Self::add).
    pub fn add_with_timeout<F, Fut>(
        &self,
        name: impl Into<Cow<'static, str>>,
        close: F,
        deadline: Duration,
    ) -> Result<(), TerminatorError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), CloseError>> + Send + 'static,
    {
        self.register(ResourceSpec::from_fn(name, close).with_deadline(deadline))
    }

    /// Registers a prepared [`ResourceSpec`].
    pub fn register(&self, spec: ResourceSpec) -> Result<(), TerminatorError> {
        self.shared.registry.register(spec)
    }

    /// Installs the observer invoked once with the final report.
    ///
    /// It runs after every resource has an outcome and before [`wait`](Self::wait)
    /// callers are released. Only one callback may be set.
    pub fn set_callback<F>(&self, callback: F) -> Result<(), TerminatorError>
    where
        F: FnOnce(&TerminationReport) + Send + 'static,
    {
        self.shared.registry.set_callback(Box::new(callback))
    }

    /// Waits until the shutdown sequence has completed or `timeout` elapses.
    ///
    /// Returns `true` once completed (immediately on every later call), `false`
    /// on timeout. A timeout does not affect the running sequence.
    pub async fn wait(&self, timeout: Duration) -> bool {
        self.shared.completion.wait(timeout).await.is_some()
    }

    /// Like [`wait`](Self::wait) but hands back the final report.
    pub async fn wait_report(&self, timeout: Duration) -> Option<Arc<TerminationReport>> {
        self.shared.completion.wait(timeout).await
    }

    /// Returns the final report without waiting, if the sequence has completed.
    pub fn report(&self) -> Option<Arc<TerminationReport>> {
        self.shared.completion.report()
    }

    /// True once the sequence has completed and the callback has run.
    pub fn is_completed(&self) -> bool {
        self.shared.completion.is_completed()
    }

    /// True once a trigger was accepted; registrations are rejected from then on.
    pub fn is_sealed(&self) -> bool {
        self.shared.registry.is_sealed()
    }

    /// Number of registered resources not yet handed to the sequencer.
    pub fn pending(&self) -> usize {
        self.shared.registry.len()
    }

    /// Delivers a trigger programmatically. See [`TriggerHandle::fire`].
    pub fn trigger(&self, signal: Signal) -> bool {
        self.trigger.fire(signal)
    }

    /// Returns a cloneable handle for delivering a trigger from elsewhere.
    pub fn trigger_handle(&self) -> TriggerHandle {
        self.trigger.clone()
    }

    /// OS-level identities actually subscribed on this platform.
    pub fn subscribed(&self) -> &[Signal] {
        &self.subscribed
    }

    /// Receiver for runtime events published from now on.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::events::EventKind;

    fn quiet() -> Terminator {
        Terminator::new(std::iter::empty()).expect("build")
    }

    #[tokio::test]
    async fn callback_runs_before_waiters_are_released() {
        let term = quiet();
        let seen_by_callback = Arc::new(Mutex::new(None));
        let probe = term.clone();
        let slot = seen_by_callback.clone();
        term.set_callback(move |report| {
            *slot.lock().unwrap() = Some((probe.is_completed(), report.outcomes.len()));
        })
        .unwrap();
        term.add("a", |_ctx: CancellationToken| async { Ok(()) }).unwrap();

        assert!(term.trigger(Signal::Interrupt));
        assert!(term.wait(Duration::from_secs(1)).await);
        assert_eq!(*seen_by_callback.lock().unwrap(), Some((false, 1)));
    }

    #[tokio::test]
    async fn callback_invoked_exactly_once() {
        let term = quiet();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        term.set_callback(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(matches!(
            term.set_callback(|_| {}),
            Err(TerminatorError::CallbackAlreadySet)
        ));

        term.trigger(Signal::Terminate);
        assert!(term.wait(Duration::from_secs(1)).await);
        term.trigger(Signal::Terminate);
        assert!(term.wait(Duration::from_secs(1)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registration_after_trigger_is_rejected() {
        let term = quiet();
        term.trigger(Signal::custom("test"));
        assert!(term.wait(Duration::from_secs(1)).await);

        assert!(term.is_sealed());
        let err = term
            .add("late", |_ctx: CancellationToken| async { Ok(()) })
            .unwrap_err();
        assert_eq!(err.as_label(), "registry_sealed");
        assert_eq!(term.report().unwrap().outcomes.len(), 0);
    }

    #[tokio::test]
    async fn second_trigger_is_ignored() {
        let term = quiet();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        term.add("gate", move |_ctx: CancellationToken| async move {
            let _ = release_rx.await;
            Ok(())
        })
        .unwrap();

        assert!(term.trigger(Signal::Interrupt));
        tokio::time::timeout(Duration::from_secs(1), async {
            while !term.is_sealed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("sealed");
        // wait until the monitor releases its subscription
        tokio::time::timeout(Duration::from_secs(1), async {
            while !term.trigger_handle().is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("unsubscribed");

        assert!(!term.trigger(Signal::Terminate));
        let _ = release_tx.send(());

        let report = term.wait_report(Duration::from_secs(1)).await.unwrap();
        assert_eq!(report.signal, Signal::Interrupt);
    }

    #[tokio::test]
    async fn wait_zero_is_a_non_blocking_check() {
        let term = quiet();
        assert!(!term.wait(Duration::ZERO).await);
        assert!(term.report().is_none());
        assert_eq!(term.pending(), 0);
    }

    #[tokio::test]
    async fn events_report_trigger_and_completion() {
        let term = quiet();
        let mut rx = term.events();
        term.add("a", |_ctx: CancellationToken| async { Ok(()) }).unwrap();
        term.trigger(Signal::Hangup);
        assert!(term.wait(Duration::from_secs(1)).await);

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::ResourceRegistered,
                EventKind::TriggerReceived,
                EventKind::ResourceClosing,
                EventKind::ResourceClosed,
                EventKind::SequenceCompleted,
            ]
        );
    }
}
