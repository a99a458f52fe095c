//! # Runtime configuration.
//!
//! Provides [`Config`], centralized settings for a [`Terminator`](crate::Terminator).
//!
//! ## Sentinel values
//! - `signals = []` → no OS subscription; the terminator fires only through a
//!   [`TriggerHandle`](crate::TriggerHandle)
//! - `bus_capacity = 0` → clamped to 1

use crate::signals::Signal;

/// Configuration for a terminator instance.
///
/// ## Field semantics
/// - `signals`: trigger identities subscribed at the OS level (duplicates are ignored)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Trigger identities to subscribe to at construction time.
    ///
    /// [`Signal::Custom`] entries are accepted but never subscribed at the OS
    /// level; they only document which programmatic triggers the host expects.
    pub signals: Vec<Signal>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a config subscribed to the given identities, other fields default.
    pub fn with_signals(signals: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns the subscription set with duplicates removed, first occurrence wins.
    pub fn unique_signals(&self) -> Vec<Signal> {
        let mut out: Vec<Signal> = Vec::with_capacity(self.signals.len());
        for s in &self.signals {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `signals = [SIGINT, SIGTERM]`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            signals: vec![Signal::Interrupt, Signal::Terminate],
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_dropped_in_order() {
        let cfg = Config::with_signals([
            Signal::Terminate,
            Signal::Interrupt,
            Signal::Terminate,
            Signal::custom("x"),
            Signal::custom("x"),
        ]);
        assert_eq!(
            cfg.unique_signals(),
            vec![Signal::Terminate, Signal::Interrupt, Signal::custom("x")]
        );
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = Config {
            signals: Vec::new(),
            bus_capacity: 0,
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
