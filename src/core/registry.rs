//! # Resource registry with a sealed phase.
//!
//! Append-only list of [`ResourceSpec`]s plus the optional termination
//! callback. The monitor seals the registry when it accepts a trigger and
//! takes everything out in the same critical section.
//!
//! ```text
//! open ──► add()/register()/set_callback() append
//!   │
//!   └─ seal() ──► sealed: drain (resources, callback) to the sequencer
//!                   └─► later add()/set_callback() → Err(Sealed)
//! ```
//!
//! ## Rules
//! - Registration never fails while the registry is open.
//! - Sealing and draining happen under one lock, so a registration is either
//!   included in the sequence or rejected, never lost.
//! - At most one callback can be installed.

use std::borrow::Cow;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::error::TerminatorError;
use crate::events::{Bus, Event, EventKind};
use crate::report::TerminationReport;
use crate::resources::ResourceSpec;

/// Observer invoked once with the final report.
pub(crate) type Callback = Box<dyn FnOnce(&TerminationReport) + Send + 'static>;

#[derive(Default)]
struct State {
    sealed: bool,
    resources: Vec<ResourceSpec>,
    callback: Option<Callback>,
}

/// Everything the sequencer needs, taken out of a sealed registry.
pub(crate) struct Sealed {
    pub resources: Vec<ResourceSpec>,
    pub callback: Option<Callback>,
}

pub(crate) struct Registry {
    state: Mutex<State>,
    bus: Bus,
}

impl Registry {
    pub fn new(bus: Bus) -> Self {
        Self {
            state: Mutex::new(State::default()),
            bus,
        }
    }

    /// Appends a resource, or rejects it once sealed.
    pub fn register(&self, spec: ResourceSpec) -> Result<(), TerminatorError> {
        let mut state = self.lock();
        if state.sealed {
            drop(state);
            let name = spec.name().to_owned();
            warn!(resource = %name, "registration after shutdown began; rejected");
            self.bus
                .publish(Event::new(EventKind::RegistrationRejected).with_resource(name.as_str()));
            return Err(TerminatorError::Sealed {
                name: Cow::Owned(name),
            });
        }

        let mut ev = Event::new(EventKind::ResourceRegistered)
            .with_resource(spec.name())
            .with_position(state.resources.len() + 1);
        if let Some(d) = spec.deadline() {
            ev = ev.with_deadline(d);
        }
        state.resources.push(spec);
        drop(state);

        self.bus.publish(ev);
        Ok(())
    }

    /// Installs the termination callback.
    pub fn set_callback(&self, cb: Callback) -> Result<(), TerminatorError> {
        let mut state = self.lock();
        if state.sealed {
            return Err(TerminatorError::Sealed {
                name: Cow::Borrowed("<callback>"),
            });
        }
        if state.callback.is_some() {
            return Err(TerminatorError::CallbackAlreadySet);
        }
        state.callback = Some(cb);
        Ok(())
    }

    /// Seals the registry and takes its contents.
    ///
    /// Returns `None` if it was already sealed.
    pub fn seal(&self) -> Option<Sealed> {
        let mut state = self.lock();
        if state.sealed {
            return None;
        }
        state.sealed = true;
        Some(Sealed {
            resources: std::mem::take(&mut state.resources),
            callback: state.callback.take(),
        })
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }

    /// Number of resources waiting to be closed (0 once sealed).
    pub fn len(&self) -> usize {
        self.lock().resources.len()
    }

    // Registry invariants hold across a panicking caller, so poison is ignored.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::error::CloseError;

    fn spec(name: &'static str) -> ResourceSpec {
        ResourceSpec::from_fn(name, |_ctx: CancellationToken| async { Ok::<_, CloseError>(()) })
    }

    #[test]
    fn seal_drains_in_registration_order() {
        let reg = Registry::new(Bus::new(8));
        reg.register(spec("a")).unwrap();
        reg.register(spec("b").with_deadline(Duration::from_secs(1)))
            .unwrap();
        assert_eq!(reg.len(), 2);

        let sealed = reg.seal().expect("first seal");
        let names: Vec<_> = sealed.resources.iter().map(|r| r.name().to_owned()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(reg.is_sealed());
        assert_eq!(reg.len(), 0);
        assert!(reg.seal().is_none());
    }

    #[test]
    fn late_registration_is_rejected() {
        let reg = Registry::new(Bus::new(8));
        let _ = reg.seal();
        let err = reg.register(spec("late")).unwrap_err();
        assert!(matches!(err, TerminatorError::Sealed { ref name } if name == "late"));
    }

    #[test]
    fn callback_is_single_registration() {
        let reg = Registry::new(Bus::new(8));
        reg.set_callback(Box::new(|_: &TerminationReport| {})).unwrap();
        assert!(matches!(
            reg.set_callback(Box::new(|_: &TerminationReport| {})),
            Err(TerminatorError::CallbackAlreadySet)
        ));

        let sealed = reg.seal().unwrap();
        assert!(sealed.callback.is_some());
        assert!(matches!(
            reg.set_callback(Box::new(|_: &TerminationReport| {})),
            Err(TerminatorError::Sealed { .. })
        ));
    }

    #[tokio::test]
    async fn registration_publishes_position() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let reg = Registry::new(bus);
        reg.register(spec("a")).unwrap();
        reg.register(spec("b")).unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::ResourceRegistered);
        assert_eq!(first.position, Some(1));
        assert_eq!(second.resource.as_deref(), Some("b"));
        assert_eq!(second.position, Some(2));
    }
}
