//! # termvisor
//!
//! **Termvisor** is a graceful-termination orchestrator for tokio services.
//!
//! Register named, closeable resources up front. When a termination signal
//! arrives, every resource is closed exactly once, in reverse registration
//! order, each under its own optional deadline. The outcome of each close is
//! collected into a [`TerminationReport`] that is handed to an optional
//! callback and to everyone waiting on [`Terminator::wait`].
//!
//! ## Architecture
//! ```text
//!   add("db")   add("cache")   add_with_timeout("http", 2s)
//!       │            │                 │
//!       ▼            ▼                 ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │ Registry  [db, cache, http]        (sealed on trigger)    │
//! └───────────────────────────────┬───────────────────────────┘
//!                                 │
//!   SIGINT / SIGTERM / TriggerHandle::fire
//!                                 ▼
//!                         ┌───────────────┐
//!                         │    Monitor    │  first trigger only,
//!                         └───────┬───────┘  then unsubscribe
//!                                 ▼
//!                         ┌───────────────┐   spawn close task per resource
//!                         │   Sequencer   │── http ─► cache ─► db
//!                         └───────┬───────┘   (one at a time, deadline each)
//!                                 ▼
//!                        TerminationReport
//!                                 │
//!                  callback(&report)  (optional, once)
//!                                 ▼
//!                        Completion gate ──► wait() == true
//! ```
//!
//! Runtime events (registration, closing, deadline hits, completion) are
//! published on a broadcast bus and fanned out to [`Subscribe`]rs.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Orchestration** | Register resources, trigger, wait for completion.            | [`Terminator`], [`TriggerHandle`]         |
//! | **Resources**     | One-shot, cancellation-aware close operations.               | [`Closer`], [`CloseFn`], [`ResourceSpec`] |
//! | **Reporting**     | Per-resource outcomes and aggregate failure count.           | [`TerminationReport`], [`Outcome`]        |
//! | **Errors**        | Typed errors for close operations and the runtime.           | [`CloseError`], [`TerminatorError`]       |
//! | **Subscriber API**| Hook into runtime events (logging, metrics).                 | [`Subscribe`], [`Event`]                  |
//! | **Configuration** | Signals to subscribe, bus capacity.                          | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that renders events as `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use termvisor::{CloseError, Config, Signal, Terminator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let term = Terminator::builder(Config::default()).build()?;
//!
//!     term.add("db", |_ctx: CancellationToken| async move {
//!         // flush and close connections...
//!         Ok::<_, CloseError>(())
//!     })?;
//!     term.set_callback(|report| {
//!         for o in &report.outcomes {
//!             println!("{} {}", o.name, o.status);
//!         }
//!     })?;
//!
//!     // A SIGINT/SIGTERM would do the same.
//!     term.trigger(Signal::Interrupt);
//!
//!     assert!(term.wait(Duration::from_secs(5)).await);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod report;
mod resources;
mod signals;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Terminator, TerminatorBuilder, TriggerHandle};
pub use error::{CloseError, TerminatorError};
pub use events::{Bus, Event, EventKind};
pub use report::{CloseStatus, Outcome, TerminationReport};
pub use resources::{BoxCloseFuture, CloseFn, Closer, ResourceSpec};
pub use signals::Signal;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a tracing-backed event writer.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
