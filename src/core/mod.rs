//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`Terminator`] (with its builder,
//! [`Config`] and [`TriggerHandle`]).
//!
//! Internal modules:
//! - [`registry`]: append-only resource list with a sealed phase;
//! - [`monitor`]: waits for the first trigger and drives the sequence once;
//! - [`sequencer`]: closes resources in reverse with per-resource deadlines;
//! - [`completion`]: one-shot gate released after the callback runs;
//! - [`trigger`]: programmatic trigger source shared with OS listeners.

mod builder;
mod completion;
mod config;
mod monitor;
mod registry;
mod sequencer;
mod terminator;
mod trigger;

pub use builder::TerminatorBuilder;
pub use config::Config;
pub use terminator::Terminator;
pub use trigger::TriggerHandle;
