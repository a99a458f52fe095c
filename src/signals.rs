//! # Trigger identities and OS signal subscription.
//!
//! [`Signal`] names the external event that starts the shutdown sequence.
//! The four named kinds map to OS signals; [`Signal::Custom`] covers
//! application-defined triggers delivered through a [`TriggerHandle`].
//!
//! ## Platforms
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//! - `SIGHUP` (controlling terminal closed)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via `tokio::signal::windows::ctrl_c`; other kinds are skipped.
//!
//! ## Unsubscribe
//! Each OS listener is a task bound to the monitor's `unsubscribe` token.
//! Once cancelled the listener stops forwarding. tokio keeps the process-level
//! handler installed, so the default disposition of the signal is not restored.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::TriggerHandle;
use crate::error::TerminatorError;

/// External trigger identity that starts the shutdown sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` / Ctrl-C.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
    /// Application-defined trigger; never subscribed at the OS level.
    Custom(Arc<str>),
}

impl Signal {
    /// Creates an application-defined trigger identity.
    pub fn custom(name: impl Into<Arc<str>>) -> Self {
        Signal::Custom(name.into())
    }

    /// Returns the conventional name of the signal.
    pub fn as_str(&self) -> &str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::Custom(name) => name,
        }
    }

    /// True if the identity can be subscribed at the OS level on this platform.
    pub fn is_os(&self) -> bool {
        if cfg!(unix) {
            !matches!(self, Signal::Custom(_))
        } else if cfg!(windows) {
            matches!(self, Signal::Interrupt)
        } else {
            false
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installs an OS listener for `signal` that forwards into `handle`.
///
/// Returns `Ok(false)` when the identity cannot be subscribed on this platform.
pub(crate) fn subscribe(
    signal: &Signal,
    handle: TriggerHandle,
    unsubscribe: CancellationToken,
) -> Result<bool, TerminatorError> {
    if !signal.is_os() {
        if !matches!(signal, Signal::Custom(_)) {
            warn!(signal = %signal, "signal not supported on this platform; skipping");
        }
        return Ok(false);
    }
    listen(signal, handle, unsubscribe)?;
    Ok(true)
}

#[cfg(unix)]
fn listen(
    signal: &Signal,
    handle: TriggerHandle,
    unsubscribe: CancellationToken,
) -> Result<(), TerminatorError> {
    use tokio::signal::unix::{SignalKind, signal as os_signal};

    let kind = match signal {
        Signal::Interrupt => SignalKind::interrupt(),
        Signal::Terminate => SignalKind::terminate(),
        Signal::Quit => SignalKind::quit(),
        Signal::Hangup => SignalKind::hangup(),
        Signal::Custom(_) => return Ok(()),
    };
    let mut stream = os_signal(kind).map_err(|source| TerminatorError::Subscribe {
        signal: signal.clone(),
        source,
    })?;

    let signal = signal.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = unsubscribe.cancelled() => break,
                got = stream.recv() => match got {
                    Some(()) => { handle.fire(signal.clone()); }
                    None => break,
                }
            }
        }
    });
    Ok(())
}

#[cfg(windows)]
fn listen(
    signal: &Signal,
    handle: TriggerHandle,
    unsubscribe: CancellationToken,
) -> Result<(), TerminatorError> {
    let mut stream =
        tokio::signal::windows::ctrl_c().map_err(|source| TerminatorError::Subscribe {
            signal: signal.clone(),
            source,
        })?;

    let signal = signal.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = unsubscribe.cancelled() => break,
                got = stream.recv() => match got {
                    Some(()) => { handle.fire(signal.clone()); }
                    None => break,
                }
            }
        }
    });
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn listen(
    _signal: &Signal,
    _handle: TriggerHandle,
    _unsubscribe: CancellationToken,
) -> Result<(), TerminatorError> {
    Ok(())
}
