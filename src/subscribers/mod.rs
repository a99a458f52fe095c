//! # Event subscribers for the termvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//!   Registry / Monitor / Sequencer ── publish(Event) ──► Bus
//!                                                         │
//!                                              subscriber_listener
//!                                                         │
//!                                                   SubscriberSet
//!                                              ┌──────────┼──────────┐
//!                                              ▼          ▼          ▼
//!                                          LogWriter   Metrics    Custom
//! ```
//!
//! Subscribers are observers only: they never influence close order, outcomes
//! or completion. Use the termination callback for the final report.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
